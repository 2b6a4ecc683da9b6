//! # GA Report Charts
//!
//! Renders the five conversion views to PNG files with plotters:
//!
//! * line charts (time series, cumulative, cumulative uplift) through
//!   [`LineChartRenderer`]
//! * annotated bar charts (CR by version, uplift by version) through
//!   [`BarChartRenderer`]
//!
//! Files land in a per-run [`OutputDir`] named after the run date.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod annotate;
pub mod output;
pub mod renderer;
pub mod types;
pub mod utils;

pub use annotate::{bar_labels, BarGeometry};
pub use output::OutputDir;
pub use renderer::{parse_color, BarChartRenderer, ChartRenderer, LineChartRenderer};
pub use types::{ChartKind, ChartSpec, ChartStyle};
