//! Default values for every settings section.

use crate::schema::*;
use std::path::PathBuf;

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials: CredentialsSettings::default(),
            output: OutputSettings::default(),
            chart: ChartSettings::default(),
            logging: LoggingSettings::default(),
            report: None,
        }
    }
}

impl Default for CredentialsSettings {
    fn default() -> Self {
        Self {
            client_secrets_path: PathBuf::from("client_secrets.json"),
            token_cache_path: PathBuf::from("analyticsreporting.json"),
            view_id: String::new(),
            timeout_seconds: 60,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("reporting_images"),
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        // ggplot-like look: grey panel, muted palette, 12x12 inch figure at 100 dpi
        Self {
            width: 1200,
            height: 1200,
            font_family: "sans-serif".to_string(),
            title_font_size: 24,
            label_font_size: 14,
            background_color: "#E5E5E5".to_string(),
            palette: vec![
                "#E24A33".to_string(),
                "#348ABD".to_string(),
                "#988ED5".to_string(),
                "#777777".to_string(),
                "#FBC15E".to_string(),
                "#8EBA42".to_string(),
                "#FFB5B8".to_string(),
            ],
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}
