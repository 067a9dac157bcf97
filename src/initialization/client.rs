//! HTTP client initialization.

use std::sync::Arc;

use crate::config::ClientOptions;
use crate::error_handling::InitializationError;
use reqwest::ClientBuilder;

/// Initializes the HTTP client used for registration fetches.
///
/// Creates a `reqwest::Client` configured with:
/// - Redirects disabled, so `Location` and `Attribution-Reporting-Redirect`
///   headers reach the redirect parser instead of being followed
/// - Timeout and User-Agent from options
/// - Rustls TLS backend (no native TLS)
///
/// # Arguments
///
/// * `options` - Timeout and user-agent settings
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(options: &ClientOptions) -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(options.timeout)
        .user_agent(options.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
