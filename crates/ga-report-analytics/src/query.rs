//! Report query description and its `reports:batchGet` request body.

use ga_report_common::{split_list, validate_non_empty, ReportError, Result, ViewId};
use serde::Serialize;

/// Namespace every dimension and metric is prefixed with on the wire.
pub const NAMESPACE: &str = "ga:";

/// What to ask the Analytics Reporting API for.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportQuery {
    /// View the report is read from
    pub view_id: ViewId,
    /// Start of the date range (`YYYY-MM-DD` or relative such as `7daysAgo`)
    pub start_date: String,
    /// End of the date range
    pub end_date: String,
    /// Dimension names without namespace
    pub dimensions: Vec<String>,
    /// Metric names without namespace; the first one is the CR denominator
    pub metrics: Vec<String>,
    /// Goal metric, the CR numerator
    pub goal: String,
    /// Server-side filter expression, sent verbatim
    pub filters_expression: String,
}

impl ReportQuery {
    /// Create a query for a view and date range with no columns yet
    pub fn new(
        view_id: impl Into<ViewId>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            view_id: view_id.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            dimensions: Vec::new(),
            metrics: Vec::new(),
            goal: String::new(),
            filters_expression: String::new(),
        }
    }

    /// Set the dimensions from a comma-joined list
    pub fn with_dimensions(mut self, list: &str) -> Self {
        self.dimensions = split_list(list).into_iter().map(bare).collect();
        self
    }

    /// Set the metrics from a comma-joined list
    pub fn with_metrics(mut self, list: &str) -> Self {
        self.metrics = split_list(list).into_iter().map(bare).collect();
        self
    }

    /// Set the goal metric
    pub fn with_goal(mut self, goal: &str) -> Self {
        self.goal = bare(goal.trim().to_string());
        self
    }

    /// Set the server-side filter expression
    pub fn with_filters_expression(mut self, expression: impl Into<String>) -> Self {
        self.filters_expression = expression.into();
        self
    }

    /// Metric every conversion rate divides by
    pub fn base_metric(&self) -> Option<&str> {
        self.metrics.first().map(String::as_str)
    }

    /// Columns coerced to numbers: the metrics followed by the goal
    pub fn numeric_columns(&self) -> Vec<String> {
        let mut columns = self.metrics.clone();
        if !columns.contains(&self.goal) {
            columns.push(self.goal.clone());
        }
        columns
    }

    /// Check that the query can be sent
    pub fn validate(&self) -> Result<()> {
        validate_non_empty(self.view_id.as_str(), "view_id")?;
        validate_non_empty(&self.start_date, "start_date")?;
        validate_non_empty(&self.end_date, "end_date")?;
        validate_non_empty(&self.goal, "goal")?;
        if self.metrics.is_empty() {
            return Err(ReportError::validation_field(
                "At least one metric is required",
                "metrics",
            ));
        }
        if self.dimensions.is_empty() {
            return Err(ReportError::validation_field(
                "At least one dimension is required",
                "dimensions",
            ));
        }
        Ok(())
    }

    /// Build the request body, namespacing every column
    pub fn to_request(&self) -> BatchGetRequest {
        let request = ReportRequest {
            view_id: self.view_id.as_str().to_string(),
            date_ranges: vec![DateRange {
                start_date: self.start_date.clone(),
                end_date: self.end_date.clone(),
            }],
            metrics: self
                .numeric_columns()
                .iter()
                .map(|name| Metric {
                    expression: format!("{}{}", NAMESPACE, name),
                })
                .collect(),
            dimensions: self
                .dimensions
                .iter()
                .map(|name| Dimension {
                    name: format!("{}{}", NAMESPACE, name),
                })
                .collect(),
            filters_expression: self.filters_expression.clone(),
        };

        BatchGetRequest {
            report_requests: vec![request],
        }
    }
}

fn bare(name: String) -> String {
    match name.strip_prefix(NAMESPACE) {
        Some(rest) => rest.to_string(),
        None => name,
    }
}

/// Body of a `reports:batchGet` call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetRequest {
    /// One entry per report; this client always sends one
    pub report_requests: Vec<ReportRequest>,
}

/// A single report request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Target view
    pub view_id: String,
    /// Requested date ranges
    pub date_ranges: Vec<DateRange>,
    /// Metric expressions
    pub metrics: Vec<Metric>,
    /// Dimension names
    pub dimensions: Vec<Dimension>,
    /// Server-side filter, empty for none
    pub filters_expression: String,
}

/// Inclusive date range
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First day
    pub start_date: String,
    /// Last day
    pub end_date: String,
}

/// Metric expression such as `ga:sessions`
#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    /// Expression sent to the API
    pub expression: String,
}

/// Dimension name such as `ga:date`
#[derive(Debug, Clone, Serialize)]
pub struct Dimension {
    /// Name sent to the API
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReportQuery {
        ReportQuery::new("123456", "2019-01-01", "2019-01-31")
            .with_dimensions("date, appVersion")
            .with_metrics("sessions,users")
            .with_goal("goal1Completions")
    }

    #[test]
    fn test_builder_splits_and_strips_namespace() {
        let query = ReportQuery::new("1", "7daysAgo", "today")
            .with_dimensions("ga:date,ga:appVersion,")
            .with_metrics("ga:sessions")
            .with_goal(" ga:goal1Completions ");

        assert_eq!(query.dimensions, vec!["date", "appVersion"]);
        assert_eq!(query.metrics, vec!["sessions"]);
        assert_eq!(query.goal, "goal1Completions");
        assert_eq!(query.base_metric(), Some("sessions"));
    }

    #[test]
    fn test_numeric_columns_append_goal_once() {
        let query = sample();
        assert_eq!(
            query.numeric_columns(),
            vec!["sessions", "users", "goal1Completions"]
        );

        let repeated = sample().with_goal("users");
        assert_eq!(repeated.numeric_columns(), vec!["sessions", "users"]);
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(sample().to_request()).unwrap();
        let request = &body["reportRequests"][0];

        assert_eq!(request["viewId"], "123456");
        assert_eq!(request["dateRanges"][0]["startDate"], "2019-01-01");
        assert_eq!(request["dateRanges"][0]["endDate"], "2019-01-31");
        assert_eq!(request["metrics"][0]["expression"], "ga:sessions");
        assert_eq!(request["metrics"][2]["expression"], "ga:goal1Completions");
        assert_eq!(request["dimensions"][1]["name"], "ga:appVersion");
        assert_eq!(request["filtersExpression"], "");
    }

    #[test]
    fn test_validation() {
        assert!(sample().validate().is_ok());

        let no_metrics = ReportQuery::new("1", "a", "b")
            .with_dimensions("date")
            .with_goal("goal1Completions");
        let err = no_metrics.validate().unwrap_err();
        assert!(matches!(
            err,
            ReportError::Validation { field: Some(ref f), .. } if f == "metrics"
        ));

        let no_view = ReportQuery { view_id: ViewId::from(" "), ..sample() };
        assert!(no_view.validate().is_err());
    }
}
