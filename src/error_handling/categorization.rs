//! Error categorization.
//!
//! Maps `reqwest` failures onto the crate's [`TransportError`] so the fetchers
//! never see client-library error types.

use super::types::TransportError;

/// Categorizes a `reqwest::Error` into a `TransportError`.
///
/// Status errors never reach this function: registration responses are read
/// with any status code, and non-2xx/3xx handling happens in the fetcher.
///
/// # Arguments
///
/// * `error` - The `reqwest::Error` to categorize
///
/// # Returns
///
/// The matching `TransportError`, carrying the error's display text for logs.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}
