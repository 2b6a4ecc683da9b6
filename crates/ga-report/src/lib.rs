//! # GA Report
//!
//! Conversion-rate reporting over the Analytics Reporting API.
//!
//! [`AnalyticsReport`] binds a [`ReportQuery`](ga_report_analytics::ReportQuery)
//! to a report source and an output directory and draws the five conversion
//! views. [`setup`] builds one from a settings file; the `ga-report` binary
//! runs it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod report;
pub mod setup;

pub use report::{AnalyticsReport, ChartOptions};
