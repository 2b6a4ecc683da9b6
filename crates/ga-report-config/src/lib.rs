//! # GA Report Config
//!
//! Typed settings for GA Report.
//!
//! Settings are read once from a TOML file into an explicit [`Settings`]
//! value that is handed to the report pipeline; nothing is read from ambient
//! process state.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::*;
pub use schema::*;
pub use validator::*;
