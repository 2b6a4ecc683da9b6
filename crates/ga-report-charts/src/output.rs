//! Per-run output directory.

use crate::types::ChartKind;
use chrono::{Local, NaiveDate};
use ga_report_common::{run_stamp, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// `<root>/<DD_MM_YYYY>/`, created on demand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDir {
    run_dir: PathBuf,
}

impl OutputDir {
    /// Create (if needed) the run directory for `date` under `root`
    pub fn prepare(root: &Path, date: NaiveDate) -> Result<Self> {
        let run_dir = root.join(run_stamp(date));
        std::fs::create_dir_all(&run_dir)?;
        info!("Writing charts to {}", run_dir.display());
        Ok(Self { run_dir })
    }

    /// Run directory for today's local date
    pub fn for_today(root: &Path) -> Result<Self> {
        Self::prepare(root, Local::now().date_naive())
    }

    /// The run directory
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Destination of one chart
    pub fn path_for(&self, kind: ChartKind) -> PathBuf {
        self.run_dir.join(kind.file_name())
    }
}
