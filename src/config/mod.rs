//! Library configuration and constants.
//!
//! This module provides:
//! - Default limits and windows
//! - HTTP header and JSON field name constants
//! - [`MeasurementConfig`], the explicit flag set passed into every fetch

mod constants;
mod headers;
mod types;

pub use constants::*;
pub use headers::*;
pub use types::{ClientOptions, LogFormat, LogLevel, MeasurementConfig};
