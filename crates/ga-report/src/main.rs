//! Main entry point for GA Report.

use anyhow::Context;
use ga_report_common::init_logging;
use ga_report_config::ConfigLoader;
use tracing::{error, info};

/// Settings file read from the working directory
const SETTINGS_FILE: &str = "config.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = ConfigLoader::load_from_file(SETTINGS_FILE)
        .with_context(|| format!("loading {}", SETTINGS_FILE))?;

    init_logging(&settings.logging_config()?).context("initializing logging")?;

    info!("Starting GA Report");

    match ga_report::setup::run(&settings).await {
        Ok(written) => {
            for path in &written {
                info!("Wrote {}", path.display());
            }
            Ok(())
        }
        Err(e) => {
            error!("Report failed: {}", e);
            Err(e).context("running report")
        }
    }
}
