//! Shared utility functions.

use crate::{ReportError, Result};
use chrono::NaiveDate;

/// Formats the per-run directory stamp (`DD_MM_YYYY`).
pub fn run_stamp(date: NaiveDate) -> String {
    date.format("%d_%m_%Y").to_string()
}

/// Removes a `namespace:` prefix such as `ga:` from an API column name.
pub fn strip_namespace(name: &str) -> &str {
    match name.split_once(':') {
        Some((_, rest)) => rest,
        None => name,
    }
}

/// Splits a comma-joined list, trimming entries and dropping empty ones.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validates that a string is not empty after trimming.
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ReportError::validation_field(
            format!("{} cannot be empty", field_name),
            field_name,
        ))
    } else {
        Ok(trimmed.to_string())
    }
}
