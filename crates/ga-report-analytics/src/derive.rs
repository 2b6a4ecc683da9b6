//! Conversion-rate aggregates behind each chart.
//!
//! All functions group a [`TypedTable`] by the version dimension (and by date
//! for the time-based views), sum the base metric and the goal per group and
//! derive:
//!
//! * CR = goal / metric × 100
//! * uplift = (ratio / reference ratio − 1) × 100
//!
//! A group whose metric sum is zero yields a non-finite value; it is kept
//! and left to the renderer to skip.

use crate::table::TypedTable;
use chrono::NaiveDate;
use ga_report_common::{ReportError, Result, DATE_COLUMN};
use std::collections::BTreeMap;

/// Columns a conversion rate is computed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Dimension holding the compared groups
    pub version: String,
    /// Denominator metric
    pub metric: String,
    /// Numerator goal metric
    pub goal: String,
}

impl Conversion {
    /// Describe a conversion from group dimension, base metric and goal
    pub fn new(
        version: impl Into<String>,
        metric: impl Into<String>,
        goal: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            metric: metric.into(),
            goal: goal.into(),
        }
    }
}

/// Summed metric and goal of one group
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    /// Sum of the base metric
    pub metric: f64,
    /// Sum of the goal
    pub goal: f64,
}

impl Totals {
    fn add(&mut self, other: Totals) {
        self.metric += other.metric;
        self.goal += other.goal;
    }

    /// goal / metric
    pub fn ratio(&self) -> f64 {
        self.goal / self.metric
    }

    /// Conversion rate in percent
    pub fn rate(&self) -> f64 {
        self.ratio() * 100.0
    }
}

/// One value per group, e.g. the CR of a version
#[derive(Debug, Clone, PartialEq)]
pub struct GroupValue {
    /// Group label
    pub group: String,
    /// Derived value
    pub value: f64,
}

/// Date-ordered values of one group
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Group label
    pub name: String,
    /// Points in ascending date order
    pub points: Vec<(NaiveDate, f64)>,
}

/// Uplift of `ratio` over `reference`, in percent
pub fn uplift(ratio: f64, reference: f64) -> f64 {
    (ratio / reference - 1.0) * 100.0
}

/// Sort descending by value, non-finite values last. Stable, so ties keep
/// their group order.
pub fn sort_descending(values: &mut [GroupValue]) {
    values.sort_by(|a, b| {
        a.value
            .is_finite()
            .cmp(&b.value.is_finite())
            .reverse()
            .then_with(|| b.value.total_cmp(&a.value))
    });
}

/// Find the reference group or fail with [`ReportError::ReferenceNotFound`]
pub fn lookup_reference<'a, T>(groups: &'a BTreeMap<String, T>, reference: &str) -> Result<&'a T> {
    groups
        .get(reference)
        .ok_or_else(|| ReportError::reference_not_found(reference))
}

struct Columns {
    version: usize,
    metric: usize,
    goal: usize,
}

impl Columns {
    fn resolve(table: &TypedTable, conversion: &Conversion) -> Result<Self> {
        Ok(Self {
            version: table.column_index(&conversion.version)?,
            metric: table.column_index(&conversion.metric)?,
            goal: table.column_index(&conversion.goal)?,
        })
    }
}

fn number(table: &TypedTable, row: usize, column: usize) -> Result<f64> {
    let value = &table.rows()[row][column];
    value
        .as_number()
        .ok_or_else(|| ReportError::parse(&table.columns()[column], value.to_string(), "number"))
}

fn totals_at(table: &TypedTable, row: usize, columns: &Columns) -> Result<Totals> {
    Ok(Totals {
        metric: number(table, row, columns.metric)?,
        goal: number(table, row, columns.goal)?,
    })
}

/// Metric and goal sums per version
pub fn totals_by_version(
    table: &TypedTable,
    conversion: &Conversion,
) -> Result<BTreeMap<String, Totals>> {
    let columns = Columns::resolve(table, conversion)?;
    let mut groups: BTreeMap<String, Totals> = BTreeMap::new();

    for (index, row) in table.rows().iter().enumerate() {
        let totals = totals_at(table, index, &columns)?;
        groups
            .entry(row[columns.version].to_string())
            .or_default()
            .add(totals);
    }
    Ok(groups)
}

/// Metric and goal sums per version and date
pub fn totals_by_version_and_date(
    table: &TypedTable,
    conversion: &Conversion,
) -> Result<BTreeMap<String, BTreeMap<NaiveDate, Totals>>> {
    let columns = Columns::resolve(table, conversion)?;
    let date_column = table.column_index(DATE_COLUMN)?;
    let mut groups: BTreeMap<String, BTreeMap<NaiveDate, Totals>> = BTreeMap::new();

    for (index, row) in table.rows().iter().enumerate() {
        let cell = &row[date_column];
        let date = cell
            .as_date()
            .ok_or_else(|| ReportError::parse(DATE_COLUMN, cell.to_string(), "date"))?;
        let totals = totals_at(table, index, &columns)?;
        groups
            .entry(row[columns.version].to_string())
            .or_default()
            .entry(date)
            .or_default()
            .add(totals);
    }
    Ok(groups)
}

/// CR per version, sorted descending. Feeds the bar chart.
pub fn conversion_by_version(
    table: &TypedTable,
    conversion: &Conversion,
) -> Result<Vec<GroupValue>> {
    let mut values: Vec<GroupValue> = totals_by_version(table, conversion)?
        .into_iter()
        .map(|(group, totals)| GroupValue {
            group,
            value: totals.rate(),
        })
        .collect();
    sort_descending(&mut values);
    Ok(values)
}

/// Daily CR per version. Feeds the time-series chart.
pub fn conversion_over_time(table: &TypedTable, conversion: &Conversion) -> Result<Vec<Series>> {
    Ok(totals_by_version_and_date(table, conversion)?
        .into_iter()
        .map(|(name, days)| Series {
            name,
            points: days
                .into_iter()
                .map(|(date, totals)| (date, totals.rate()))
                .collect(),
        })
        .collect())
}

fn running_totals(days: BTreeMap<NaiveDate, Totals>) -> BTreeMap<NaiveDate, Totals> {
    let mut running = Totals::default();
    days.into_iter()
        .map(|(date, totals)| {
            running.add(totals);
            (date, running)
        })
        .collect()
}

/// CR of the running metric and goal sums per version, in date order.
/// Feeds the cumulative chart.
pub fn cumulative_conversion(table: &TypedTable, conversion: &Conversion) -> Result<Vec<Series>> {
    Ok(totals_by_version_and_date(table, conversion)?
        .into_iter()
        .map(|(name, days)| Series {
            name,
            points: running_totals(days)
                .into_iter()
                .map(|(date, totals)| (date, totals.rate()))
                .collect(),
        })
        .collect())
}

/// Uplift of every version's CR over the reference version, sorted
/// descending. The reference itself shows 0. Feeds the diff chart.
pub fn uplift_by_version(
    table: &TypedTable,
    conversion: &Conversion,
    reference: &str,
) -> Result<Vec<GroupValue>> {
    let groups = totals_by_version(table, conversion)?;
    let against = lookup_reference(&groups, reference)?.ratio();

    let mut values: Vec<GroupValue> = groups
        .iter()
        .map(|(group, totals)| GroupValue {
            group: group.clone(),
            value: uplift(totals.ratio(), against),
        })
        .collect();
    sort_descending(&mut values);
    Ok(values)
}

/// Uplift of every version's cumulative CR over the reference's cumulative
/// CR on the same date. Dates the reference has no value for are skipped.
/// Feeds the diff-cumulative chart.
pub fn cumulative_uplift(
    table: &TypedTable,
    conversion: &Conversion,
    reference: &str,
) -> Result<Vec<Series>> {
    let cumulative: BTreeMap<String, BTreeMap<NaiveDate, Totals>> =
        totals_by_version_and_date(table, conversion)?
            .into_iter()
            .map(|(name, days)| (name, running_totals(days)))
            .collect();
    let against = lookup_reference(&cumulative, reference)?;

    Ok(cumulative
        .iter()
        .map(|(name, days)| Series {
            name: name.clone(),
            points: days
                .iter()
                .filter_map(|(date, totals)| {
                    against
                        .get(date)
                        .map(|base| (*date, uplift(totals.ratio(), base.ratio())))
                })
                .collect(),
        })
        .collect())
}
