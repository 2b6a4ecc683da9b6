//! # GA Report Analytics
//!
//! Fetches one report from the Analytics Reporting API and turns it into
//! conversion-rate aggregates.
//!
//! The pipeline is: [`ReportQuery`] → [`ReportSource::fetch`] →
//! [`RawReport`] → [`normalize`] → [`coerce`] → [`TypedTable`] → one of the
//! [`derive`] functions.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod coerce;
pub mod derive;
pub mod normalize;
pub mod query;
pub mod raw;
pub mod table;

pub use auth::{CachedToken, ClientSecrets, CredentialStore, StaticToken, TokenProvider};
pub use client::{AnalyticsClient, ClientConfig, ReportSource};
pub use coerce::{coerce, format_date, parse_date};
pub use derive::{Conversion, GroupValue, Series, Totals};
pub use normalize::{normalize, NormalizedTable, ReportFrame};
pub use query::ReportQuery;
pub use raw::RawReport;
pub use table::{TypedTable, Value};
