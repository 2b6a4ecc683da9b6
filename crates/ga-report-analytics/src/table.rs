//! Typed report table and the exact-match filter shared by every chart.

use chrono::NaiveDate;
use ga_report_common::{ReportError, Result};
use std::fmt;
use tracing::debug;

/// One typed cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Dimension value kept as text
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Metric value
    Number(f64),
}

impl Value {
    /// Text content, if this is a text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Date content, if this is a date cell
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Numeric content, if this is a number cell
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Exact match against a filter value.
    ///
    /// Dates match either their compact `YYYYMMDD` form or `YYYY-MM-DD`;
    /// numbers match when the needle parses to the same value.
    pub fn matches(&self, needle: &str) -> bool {
        match self {
            Self::Text(s) => s == needle,
            Self::Date(d) => {
                d.format("%Y%m%d").to_string() == needle
                    || d.format("%Y-%m-%d").to_string() == needle
            }
            Self::Number(n) => needle.trim().parse::<f64>().map_or(false, |v| v == *n),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Report table after coercion
#[derive(Debug, Clone, PartialEq)]
pub struct TypedTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TypedTable {
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in response order
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, or [`ReportError::MissingColumn`]
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ReportError::missing_column(name))
    }

    /// All values of one column
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Value> + '_> {
        let index = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[index]))
    }

    /// Keep the rows whose `dimension` cell equals `value`.
    ///
    /// Both arguments empty means "no filter" and returns the table unchanged.
    /// Supplying only one of them is rejected.
    pub fn filter_eq(&self, dimension: &str, value: &str) -> Result<TypedTable> {
        match (dimension.is_empty(), value.is_empty()) {
            (true, true) => return Ok(self.clone()),
            (true, false) | (false, true) => {
                return Err(ReportError::validation_field(
                    "Filter dimension and value must be given together",
                    "filter",
                ))
            }
            (false, false) => {}
        }

        let index = self.column_index(dimension)?;
        let rows: Vec<Vec<Value>> = self
            .rows
            .iter()
            .filter(|row| row[index].matches(value))
            .cloned()
            .collect();

        debug!(
            dimension,
            value,
            kept = rows.len(),
            total = self.rows.len(),
            "Applied exact-match filter"
        );
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }
}
