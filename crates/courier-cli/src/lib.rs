//! courier-cli
//!
//! Process-level surfaces around `courier-core`: the HTTP producer API, the
//! worker runner and logging setup.

pub mod api;
pub mod error;
pub mod telemetry;
