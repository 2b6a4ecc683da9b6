//! Settings schema definitions using serde.

use ga_report_common::{LogFormat, LoggingConfig, Result, ViewId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main settings structure for GA Report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Analytics credentials and target view.
    pub credentials: CredentialsSettings,
    /// Where chart images are written.
    pub output: OutputSettings,
    /// Chart size and styling.
    pub chart: ChartSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Report the driver binary runs, if any.
    pub report: Option<ReportSettings>,
}

/// Analytics API credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsSettings {
    /// OAuth client secrets file downloaded from the API console.
    pub client_secrets_path: PathBuf,
    /// Cached token file, rewritten after every refresh.
    pub token_cache_path: PathBuf,
    /// Analytics view to query.
    pub view_id: String,
    /// HTTP request timeout in seconds.
    pub timeout_seconds: u64,
}

/// Output location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Root folder; each run writes into a `DD_MM_YYYY` subfolder.
    pub folder: PathBuf,
}

/// Chart rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Font family for all text.
    pub font_family: String,
    /// Caption font size.
    pub title_font_size: u32,
    /// Axis and annotation font size.
    pub label_font_size: u32,
    /// Plot background color (hex).
    pub background_color: String,
    /// Series colors (hex), cycled.
    pub palette: Vec<String>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `ga_report=debug`.
    pub level: String,
    /// `pretty`, `compact` or `plain`.
    pub format: String,
    /// Optional log file, appended to.
    pub file: Option<PathBuf>,
}

/// One report run as executed by the driver binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Start of the date range (`YYYY-MM-DD` or relative such as `30daysAgo`).
    pub start_date: String,
    /// End of the date range.
    pub end_date: String,
    /// Comma-joined dimension names, without namespace.
    pub dimensions: String,
    /// Comma-joined metric names; the first one is the CR denominator.
    pub metrics: String,
    /// Goal metric name, the CR numerator.
    pub goal: String,
    /// Dimension holding the compared groups (e.g. `appVersion`).
    pub version: String,
    /// Group the diff charts compare against.
    #[serde(default)]
    pub reference: Option<String>,
    /// Server-side filter expression passed through to the API.
    #[serde(default)]
    pub filters_expression: Option<String>,
    /// Client-side exact-match filter column.
    #[serde(default)]
    pub filter_dimension: Option<String>,
    /// Client-side exact-match filter value.
    #[serde(default)]
    pub filter_value: Option<String>,
    /// Fixed value axis for line charts.
    #[serde(default)]
    pub y_range: Option<[f64; 2]>,
}

impl Settings {
    /// Typed view identifier.
    pub fn view_id(&self) -> ViewId {
        ViewId::from(self.credentials.view_id.trim())
    }

    /// Logging configuration for `ga_report_common::init_logging`.
    pub fn logging_config(&self) -> Result<LoggingConfig> {
        Ok(LoggingConfig {
            level: self.logging.level.clone(),
            format: self.logging.format.parse::<LogFormat>()?,
            file_path: self.logging.file.clone(),
            ..LoggingConfig::default()
        })
    }

    /// Resolves every relative path against `base`, usually the settings file's directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        resolve(&mut self.credentials.client_secrets_path, base);
        resolve(&mut self.credentials.token_cache_path, base);
        resolve(&mut self.output.folder, base);
        if let Some(file) = self.logging.file.as_mut() {
            resolve(file, base);
        }
    }

    /// Validates the settings.
    pub fn validate(&self) -> Result<()> {
        crate::validator::ConfigValidator::validate(self)
    }
}

fn resolve(path: &mut PathBuf, base: &Path) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}
