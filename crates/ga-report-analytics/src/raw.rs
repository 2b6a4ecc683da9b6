//! Wire types of a `reports:batchGet` response.
//!
//! Every level is optional: the API omits `rows` (and sometimes whole
//! sections) when a query matches nothing, and the normalizer decides what an
//! absent section means.

use serde::{Deserialize, Serialize};

/// Top-level batchGet response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReport {
    /// One entry per requested report
    #[serde(default)]
    pub reports: Vec<Report>,
}

/// One report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Column names
    pub column_header: Option<ColumnHeader>,
    /// Row data
    pub data: Option<ReportData>,
}

/// Header naming the dimension and metric columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnHeader {
    /// Namespaced dimension names, e.g. `ga:date`
    pub dimensions: Option<Vec<String>>,
    /// Metric header
    pub metric_header: Option<MetricHeader>,
}

/// Metric part of the header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricHeader {
    /// One entry per metric column
    #[serde(default)]
    pub metric_header_entries: Vec<MetricHeaderEntry>,
}

/// A metric column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricHeaderEntry {
    /// Namespaced metric name
    pub name: String,
    /// Declared type, e.g. `INTEGER`
    #[serde(rename = "type", default)]
    pub metric_type: Option<String>,
}

/// Row container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    /// Absent when the query matched nothing
    pub rows: Option<Vec<ReportRow>>,
    /// Total row count reported by the API
    pub row_count: Option<u64>,
}

/// One row of dimension values and per-date-range metric values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Dimension values in header order
    #[serde(default)]
    pub dimensions: Vec<String>,
    /// Metric values, one entry per date range
    #[serde(default)]
    pub metrics: Vec<DateRangeValues>,
}

/// Metric values of one date range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRangeValues {
    /// Values in metric header order
    #[serde(default)]
    pub values: Vec<String>,
}

impl RawReport {
    /// Number of rows in the first report
    pub fn row_count(&self) -> usize {
        self.reports
            .first()
            .and_then(|r| r.data.as_ref())
            .and_then(|d| d.rows.as_ref())
            .map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_response() {
        let json = r#"{
            "reports": [{
                "columnHeader": {
                    "dimensions": ["ga:date", "ga:appVersion"],
                    "metricHeader": {
                        "metricHeaderEntries": [
                            {"name": "ga:sessions", "type": "INTEGER"},
                            {"name": "ga:goal1Completions", "type": "INTEGER"}
                        ]
                    }
                },
                "data": {
                    "rows": [
                        {"dimensions": ["20190101", "1.0"], "metrics": [{"values": ["10", "2"]}]}
                    ],
                    "rowCount": 1,
                    "totals": [{"values": ["10", "2"]}]
                }
            }]
        }"#;

        let raw: RawReport = serde_json::from_str(json).unwrap();
        assert_eq!(raw.row_count(), 1);

        let header = raw.reports[0].column_header.as_ref().unwrap();
        let entries = &header.metric_header.as_ref().unwrap().metric_header_entries;
        assert_eq!(entries[1].name, "ga:goal1Completions");
        assert_eq!(entries[1].metric_type.as_deref(), Some("INTEGER"));
    }

    #[test]
    fn test_deserialize_empty_response() {
        let json = r#"{"reports": [{"columnHeader": {"dimensions": ["ga:date"]}, "data": {"totals": []}}]}"#;
        let raw: RawReport = serde_json::from_str(json).unwrap();
        assert_eq!(raw.row_count(), 0);
        assert!(raw.reports[0].data.as_ref().unwrap().rows.is_none());

        let bare: RawReport = serde_json::from_str("{}").unwrap();
        assert_eq!(bare.row_count(), 0);
    }
}
