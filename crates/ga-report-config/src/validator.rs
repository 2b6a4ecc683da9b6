//! Runtime validation of loaded settings.

use crate::schema::{ChartSettings, ReportSettings, Settings};
use chrono::NaiveDate;
use ga_report_common::{
    split_list, strip_namespace, validate_non_empty, LogFormat, ReportError, Result,
};

/// Settings validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a full settings value.
    pub fn validate(settings: &Settings) -> Result<()> {
        validate_non_empty(&settings.credentials.view_id, "credentials.view_id")?;
        if !settings.credentials.view_id.trim().chars().all(|c| c.is_ascii_digit()) {
            return Err(ReportError::validation_field(
                "View id must be numeric",
                "credentials.view_id",
            ));
        }
        if settings.credentials.timeout_seconds == 0 {
            return Err(ReportError::validation_field(
                "Timeout must be at least one second",
                "credentials.timeout_seconds",
            ));
        }

        Self::validate_chart(&settings.chart)?;
        settings.logging.format.parse::<LogFormat>()?;

        if let Some(report) = &settings.report {
            Self::validate_report(report)?;
        }
        Ok(())
    }

    /// Validates chart dimensions, font sizes and colors.
    pub fn validate_chart(chart: &ChartSettings) -> Result<()> {
        for (value, field) in [(chart.width, "chart.width"), (chart.height, "chart.height")] {
            if !(100..=4000).contains(&value) {
                return Err(ReportError::validation_field(
                    "Dimensions must be between 100 and 4000 pixels",
                    field,
                ));
            }
        }
        for (value, field) in [
            (chart.title_font_size, "chart.title_font_size"),
            (chart.label_font_size, "chart.label_font_size"),
        ] {
            if !(6..=72).contains(&value) {
                return Err(ReportError::validation_field(
                    "Font size must be between 6 and 72",
                    field,
                ));
            }
        }
        if !is_hex_color(&chart.background_color) {
            return Err(ReportError::validation_field(
                format!("'{}' is not a #RRGGBB color", chart.background_color),
                "chart.background_color",
            ));
        }
        if chart.palette.is_empty() {
            return Err(ReportError::validation_field("Palette cannot be empty", "chart.palette"));
        }
        if let Some(bad) = chart.palette.iter().find(|c| !is_hex_color(c)) {
            return Err(ReportError::validation_field(
                format!("'{}' is not a #RRGGBB color", bad),
                "chart.palette",
            ));
        }
        Ok(())
    }

    /// Validates the driver's report section.
    pub fn validate_report(report: &ReportSettings) -> Result<()> {
        let start = parse_report_date(&report.start_date, "report.start_date")?;
        let end = parse_report_date(&report.end_date, "report.end_date")?;
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ReportError::validation_field(
                    format!("start_date {} is after end_date {}", start, end),
                    "report.start_date",
                ));
            }
        }
        validate_non_empty(&report.goal, "report.goal")?;
        let version = validate_non_empty(&report.version, "report.version")?;
        let version = strip_namespace(&version);

        let dimensions = split_list(&report.dimensions);
        if !dimensions.iter().any(|d| strip_namespace(d) == version) {
            return Err(ReportError::validation_field(
                format!("Version dimension '{}' must be one of the requested dimensions", version),
                "report.dimensions",
            ));
        }
        if split_list(&report.metrics).is_empty() {
            return Err(ReportError::validation_field(
                "At least one metric is required",
                "report.metrics",
            ));
        }

        match (&report.filter_dimension, &report.filter_value) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(ReportError::validation_field(
                    "filter_dimension and filter_value must be set together",
                    "report.filter_dimension",
                ));
            }
            _ => {}
        }

        if let Some([min, max]) = report.y_range {
            if !(min < max) {
                return Err(ReportError::validation_field(
                    "y_range minimum must be below its maximum",
                    "report.y_range",
                ));
            }
        }
        Ok(())
    }
}

/// Checks a report date: `YYYY-MM-DD`, or one of the relative forms the
/// reporting API accepts (`today`, `yesterday`, `NdaysAgo`). Returns the
/// calendar date for the absolute form.
fn parse_report_date(value: &str, field: &str) -> Result<Option<NaiveDate>> {
    let value = validate_non_empty(value, field)?;
    if value == "today" || value == "yesterday" {
        return Ok(None);
    }
    if let Some(days) = value.strip_suffix("daysAgo") {
        if !days.is_empty() && days.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(None);
        }
    }
    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            ReportError::validation_field(
                format!("'{}' is not a YYYY-MM-DD date", value),
                field,
            )
        })
}

/// Returns true for `#RRGGBB` strings.
pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .map(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.credentials.view_id = "123456789".to_string();
        settings
    }

    fn report() -> ReportSettings {
        ReportSettings {
            start_date: "2019-01-01".to_string(),
            end_date: "2019-01-31".to_string(),
            dimensions: "date,appVersion".to_string(),
            metrics: "sessions".to_string(),
            goal: "goal1Completions".to_string(),
            version: "appVersion".to_string(),
            reference: Some("1.0".to_string()),
            filters_expression: None,
            filter_dimension: None,
            filter_value: None,
            y_range: None,
        }
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#E5E5E5"));
        assert!(is_hex_color("#00ff7f"));
        assert!(!is_hex_color("E5E5E5"));
        assert!(!is_hex_color("#ZZ0000"));
        assert!(!is_hex_color("#FFF"));
    }

    #[test]
    fn test_default_settings_need_a_view_id() {
        assert!(Settings::default().validate().is_err());
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn test_non_numeric_view_id_rejected() {
        let mut settings = valid_settings();
        settings.credentials.view_id = "ga:123".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_chart_bounds() {
        let mut settings = valid_settings();
        settings.chart.width = 50;
        assert!(settings.validate().is_err());

        let mut settings = valid_settings();
        settings.chart.palette = vec!["#123456".to_string(), "red".to_string()];
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_report_requires_version_among_dimensions() {
        let mut report = report();
        assert!(ConfigValidator::validate_report(&report).is_ok());

        report.dimensions = "date,platform".to_string();
        assert!(ConfigValidator::validate_report(&report).is_err());
    }

    #[test]
    fn test_report_version_ignores_namespace() {
        let mut report = report();
        report.dimensions = "ga:date,ga:appVersion".to_string();
        assert!(ConfigValidator::validate_report(&report).is_ok());

        report.version = "ga:appVersion".to_string();
        report.dimensions = "date,appVersion".to_string();
        assert!(ConfigValidator::validate_report(&report).is_ok());
    }

    #[test]
    fn test_report_dates() {
        let mut report = report();
        report.start_date = "2019-02-01".to_string();
        let err = ConfigValidator::validate_report(&report).unwrap_err();
        assert!(matches!(err, ReportError::Validation { field: Some(ref f), .. } if f == "report.start_date"));

        report.start_date = "01/01/2019".to_string();
        assert!(ConfigValidator::validate_report(&report).is_err());

        report.start_date = "30daysAgo".to_string();
        report.end_date = "yesterday".to_string();
        assert!(ConfigValidator::validate_report(&report).is_ok());

        report.start_date = "daysAgo".to_string();
        assert!(ConfigValidator::validate_report(&report).is_err());
    }

    #[test]
    fn test_report_filter_pairs() {
        let mut report = report();
        report.filter_dimension = Some("platform".to_string());
        assert!(ConfigValidator::validate_report(&report).is_err());

        report.filter_value = Some("ios".to_string());
        assert!(ConfigValidator::validate_report(&report).is_ok());
    }

    #[test]
    fn test_report_y_range_order() {
        let mut report = report();
        report.y_range = Some([5.0, 1.0]);
        assert!(ConfigValidator::validate_report(&report).is_err());

        report.y_range = Some([0.0, 40.0]);
        assert!(ConfigValidator::validate_report(&report).is_ok());
    }
}
