//! Shared resource initialization.
//!
//! - HTTP client (redirects disabled, timeout, user agent)
//! - Logger (plain or JSON output)

mod client;
mod logger;

pub use client::init_client;
pub use logger::init_logger_with;
