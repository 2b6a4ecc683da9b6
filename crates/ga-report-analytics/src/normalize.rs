//! Flattening a raw report into a string table.

use crate::raw::RawReport;
use ga_report_common::{strip_namespace, ReportError, Result};
use tracing::{debug, warn};

/// Column name of the placeholder table shown for an empty result.
pub const NO_DATA_COLUMN: &str = "error";
/// Message of the placeholder table shown for an empty result.
pub const NO_DATA_MESSAGE: &str = "no data for this query";

/// Rectangular table of untyped cells with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl NormalizedTable {
    /// Build a table, rejecting rows whose width differs from the header
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ReportError::validation(format!(
                "Row {} has {} cells but the header has {} columns",
                index,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in response order
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Vec<String>>) {
        (self.columns, self.rows)
    }
}

/// Result of normalizing a report: rows, or an explicit "nothing matched"
#[derive(Debug, Clone, PartialEq)]
pub enum ReportFrame {
    /// At least one row
    Rows(NormalizedTable),
    /// The query matched nothing or the response had no usable section
    NoData,
}

impl ReportFrame {
    /// Whether this is the empty-result variant
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoData)
    }

    /// The rows, or [`ReportError::NoData`]
    pub fn into_table(self) -> Result<NormalizedTable> {
        match self {
            Self::Rows(table) => Ok(table),
            Self::NoData => Err(ReportError::NoData),
        }
    }

    /// Table for display: the rows, or a one-cell table carrying the no-data message
    pub fn into_display_table(self) -> NormalizedTable {
        match self {
            Self::Rows(table) => table,
            Self::NoData => NormalizedTable {
                columns: vec![NO_DATA_COLUMN.to_string()],
                rows: vec![vec![NO_DATA_MESSAGE.to_string()]],
            },
        }
    }
}

/// Flatten the first report of a response.
///
/// Columns are the header's dimension names followed by its metric names,
/// namespace stripped. Each row is its dimension values followed by the
/// values of the first date range. A response without rows, or missing a
/// header section, normalizes to [`ReportFrame::NoData`].
pub fn normalize(raw: &RawReport) -> Result<ReportFrame> {
    let Some(report) = raw.reports.first() else {
        warn!("Response contained no report");
        return Ok(ReportFrame::NoData);
    };

    let header = report.column_header.as_ref();
    let dimensions = header.and_then(|h| h.dimensions.as_ref());
    let metrics = header.and_then(|h| h.metric_header.as_ref());
    let rows = report.data.as_ref().and_then(|d| d.rows.as_ref());

    let (Some(dimensions), Some(metrics), Some(rows)) = (dimensions, metrics, rows) else {
        warn!("Response has no rows or an incomplete header");
        return Ok(ReportFrame::NoData);
    };
    if rows.is_empty() {
        warn!("Response has an empty row list");
        return Ok(ReportFrame::NoData);
    }

    let columns: Vec<String> = dimensions
        .iter()
        .map(String::as_str)
        .chain(metrics.metric_header_entries.iter().map(|m| m.name.as_str()))
        .map(|name| strip_namespace(name).to_string())
        .collect();

    let mut table_rows = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let first_range = row.metrics.first().ok_or_else(|| {
            ReportError::validation(format!("Row {} has no metric values", index))
        })?;
        let mut cells = row.dimensions.clone();
        cells.extend(first_range.values.iter().cloned());
        table_rows.push(cells);
    }

    debug!(
        columns = columns.len(),
        rows = table_rows.len(),
        "Normalized report"
    );
    NormalizedTable::new(columns, table_rows).map(ReportFrame::Rows)
}
