//! Settings file loading.

use crate::schema::Settings;
use ga_report_common::{ReportError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Settings loader bound to one TOML file.
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new settings loader.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path this loader reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads, resolves and validates the settings file.
    pub fn load(&self) -> Result<Settings> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ReportError::config_with_source(
                format!("Failed to read settings file {}", self.path.display()),
                e,
            )
        })?;
        let base = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let settings = Self::from_toml_str(&content, &base)?;
        info!(path = %self.path.display(), view_id = %settings.view_id(), "Loaded settings");
        Ok(settings)
    }

    /// Parses settings from TOML text, resolving relative paths against `base`.
    pub fn from_toml_str(content: &str, base: &Path) -> Result<Settings> {
        let mut settings: Settings = toml::from_str(content)?;
        settings.resolve_paths(base);
        debug!(?settings, "Parsed settings");
        settings.validate()?;
        Ok(settings)
    }

    /// Convenience wrapper around [`ConfigLoader::new`] and [`ConfigLoader::load`].
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Settings> {
        Self::new(path.as_ref()).load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        file
    }

    #[test]
    fn test_load_minimal_file_uses_defaults() {
        let file = create_test_config_file("[credentials]\nview_id = \"42\"\n");
        let settings = ConfigLoader::load_from_file(file.path()).expect("Failed to load settings");

        assert_eq!(settings.credentials.view_id, "42");
        assert_eq!(settings.chart.width, 1200);
        assert_eq!(settings.logging.level, "info");
        assert!(settings.report.is_none());
    }

    #[test]
    fn test_relative_paths_resolve_next_to_file() {
        let file = create_test_config_file(
            "[credentials]\nview_id = \"42\"\nclient_secrets_path = \"secrets/client.json\"\n\n[output]\nfolder = \"/tmp/absolute\"\n",
        );
        let settings = ConfigLoader::load_from_file(file.path()).unwrap();
        let dir = file.path().parent().unwrap();

        assert_eq!(settings.credentials.client_secrets_path, dir.join("secrets/client.json"));
        assert_eq!(settings.credentials.token_cache_path, dir.join("analyticsreporting.json"));
        assert_eq!(settings.output.folder, PathBuf::from("/tmp/absolute"));
    }

    #[test]
    fn test_invalid_toml() {
        let file = create_test_config_file("[credentials\nview_id = ");
        let result = ConfigLoader::load_from_file(file.path());
        assert!(matches!(result, Err(ReportError::Config { .. })));
    }

    #[test]
    fn test_validation_error() {
        let file = create_test_config_file("[credentials]\nview_id = \"\"\n");
        let result = ConfigLoader::load_from_file(file.path());
        assert!(matches!(result, Err(ReportError::Validation { .. })));
    }

    #[test]
    fn test_missing_config_file() {
        let result = ConfigLoader::load_from_file("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ReportError::Config { .. })));
    }
}
