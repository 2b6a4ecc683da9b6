//! Building a report run from [`Settings`].

use crate::report::{AnalyticsReport, ChartOptions};
use ga_report_analytics::{
    AnalyticsClient, ClientConfig, CredentialStore, ReportFrame, ReportQuery,
};
use ga_report_charts::{ChartStyle, OutputDir};
use ga_report_common::{ReportError, Result};
use ga_report_config::{ChartSettings, ReportSettings, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Query described by the `[report]` table
pub fn query_from_settings(settings: &Settings, report: &ReportSettings) -> ReportQuery {
    let query = ReportQuery::new(settings.view_id(), &report.start_date, &report.end_date)
        .with_dimensions(&report.dimensions)
        .with_metrics(&report.metrics)
        .with_goal(&report.goal);
    match &report.filters_expression {
        Some(expression) => query.with_filters_expression(expression.as_str()),
        None => query,
    }
}

/// Chart style from the `[chart]` table
pub fn style_from_settings(chart: &ChartSettings) -> ChartStyle {
    ChartStyle {
        width: chart.width,
        height: chart.height,
        font_family: chart.font_family.clone(),
        title_font_size: chart.title_font_size,
        label_font_size: chart.label_font_size,
        background_color: chart.background_color.clone(),
        palette: chart.palette.clone(),
    }
}

/// Chart options from the `[report]` table
pub fn chart_options(report: &ReportSettings) -> ChartOptions {
    let options = ChartOptions::default().filtered(
        report.filter_dimension.clone().unwrap_or_default(),
        report.filter_value.clone().unwrap_or_default(),
    );
    match report.y_range {
        Some([min, max]) => options.with_y_range(min, max),
        None => options,
    }
}

/// Reporting API client authenticated through the credential cache
pub fn client_from_settings(settings: &Settings) -> Result<AnalyticsClient> {
    let credentials = &settings.credentials;
    let store = CredentialStore::new(
        credentials.token_cache_path.clone(),
        credentials.client_secrets_path.clone(),
    );
    AnalyticsClient::new(
        ClientConfig::default().with_timeout(credentials.timeout_seconds),
        Arc::new(store),
    )
}

/// Run the `[report]` table end to end and return the written chart paths
pub async fn run(settings: &Settings) -> Result<Vec<PathBuf>> {
    let report_settings = settings
        .report
        .as_ref()
        .ok_or_else(|| ReportError::config("Settings have no [report] table"))?;

    let output = OutputDir::for_today(&settings.output.folder)?;
    let report = AnalyticsReport::new(
        client_from_settings(settings)?,
        query_from_settings(settings, report_settings),
        &report_settings.version,
        output,
        style_from_settings(&settings.chart),
    )?;

    let data = match report.full_data().await {
        Err(ReportError::NoData) => {
            let marker = ReportFrame::NoData.into_display_table();
            warn!(
                "{}: {}",
                marker.columns()[0],
                marker.rows()[0][0]
            );
            return Err(ReportError::NoData);
        }
        other => other?,
    };

    let written = report.render_all(
        &data,
        report_settings.reference.as_deref(),
        &chart_options(report_settings),
    )?;
    info!(
        charts = written.len(),
        "Report written to {}",
        report.output().run_dir().display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ga_report_config::ConfigLoader;
    use std::path::Path;

    const SETTINGS: &str = r##"
[credentials]
view_id = "123456"
timeout_seconds = 30

[chart]
width = 800
height = 600
palette = ["#112233"]

[report]
start_date = "2019-01-01"
end_date = "2019-01-31"
dimensions = "date,appVersion"
metrics = "sessions,users"
goal = "goal1Completions"
version = "appVersion"
reference = "1.0"
filters_expression = "ga:deviceCategory==mobile"
filter_dimension = "appVersion"
filter_value = "1.0"
y_range = [0.0, 25.0]
"##;

    fn settings() -> Settings {
        ConfigLoader::from_toml_str(SETTINGS, Path::new("/srv/report")).unwrap()
    }

    #[test]
    fn test_query_from_settings() {
        let settings = settings();
        let query = query_from_settings(&settings, settings.report.as_ref().unwrap());

        assert_eq!(query.view_id.as_str(), "123456");
        assert_eq!(query.dimensions, vec!["date", "appVersion"]);
        assert_eq!(query.metrics, vec!["sessions", "users"]);
        assert_eq!(query.goal, "goal1Completions");
        assert_eq!(query.filters_expression, "ga:deviceCategory==mobile");
    }

    #[test]
    fn test_style_and_options_from_settings() {
        let settings = settings();
        let style = style_from_settings(&settings.chart);
        assert_eq!((style.width, style.height), (800, 600));
        assert_eq!(style.palette, vec!["#112233"]);

        let options = chart_options(settings.report.as_ref().unwrap());
        assert_eq!(options.filter_dimension, "appVersion");
        assert_eq!(options.filter_value, "1.0");
        assert_eq!(options.y_range, Some((0.0, 25.0)));
        assert!(options.title.is_none());
    }

    #[test]
    fn test_client_from_settings() {
        let client = client_from_settings(&settings()).unwrap();
        assert_eq!(
            client.endpoint(),
            ga_report_analytics::client::DEFAULT_ENDPOINT
        );
    }

    #[tokio::test]
    async fn test_run_without_report_table() {
        let mut settings = settings();
        settings.report = None;
        let err = run(&settings).await.unwrap_err();
        assert!(matches!(err, ReportError::Config { .. }));
    }
}
