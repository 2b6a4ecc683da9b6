//! Typing a normalized table: dates and numeric columns.

use crate::normalize::NormalizedTable;
use crate::table::{TypedTable, Value};
use chrono::NaiveDate;
use ga_report_common::{ReportError, Result, DATE_COLUMN};
use tracing::debug;

/// Parse a compact `YYYYMMDD` date.
///
/// Anything that is not exactly eight ASCII digits forming a valid calendar
/// day yields `None`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y%m%d").ok()
}

/// Format a date back to `YYYYMMDD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Convert the `date` column to dates and every column named in
/// `numeric_columns` to 64-bit floats. Other columns stay text.
///
/// Every declared column must be present, and every cell in them must parse.
pub fn coerce(table: NormalizedTable, numeric_columns: &[String]) -> Result<TypedTable> {
    let date_index = table
        .column_index(DATE_COLUMN)
        .ok_or_else(|| ReportError::missing_column(DATE_COLUMN))?;

    let numeric_indices = numeric_columns
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| ReportError::missing_column(name.as_str()))
        })
        .collect::<Result<Vec<usize>>>()?;

    let (columns, rows) = table.into_parts();
    let mut typed_rows = Vec::with_capacity(rows.len());

    for row in rows {
        let mut typed = Vec::with_capacity(row.len());
        for (index, cell) in row.into_iter().enumerate() {
            let value = if index == date_index {
                let date = parse_date(&cell)
                    .ok_or_else(|| ReportError::parse(&columns[index], &cell, "YYYYMMDD date"))?;
                Value::Date(date)
            } else if numeric_indices.contains(&index) {
                let number = cell
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ReportError::parse(&columns[index], &cell, "number"))?;
                Value::Number(number)
            } else {
                Value::Text(cell)
            };
            typed.push(value);
        }
        typed_rows.push(typed);
    }

    debug!(
        rows = typed_rows.len(),
        numeric = numeric_indices.len(),
        "Coerced report table"
    );
    Ok(TypedTable::from_parts(columns, typed_rows))
}
