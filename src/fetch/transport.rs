//! The HTTP round trip behind a fetch.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::headers::ResponseHeaders;
use crate::config::ClientOptions;
use crate::error_handling::{categorize_reqwest_error, InitializationError, TransportError};
use crate::initialization::init_client;

/// Status code and headers of a registration response. The body is never
/// read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: ResponseHeaders,
}

impl TransportResponse {
    pub fn new(status: u16, headers: ResponseHeaders) -> Self {
        Self { status, headers }
    }

    /// 2xx and 3xx responses are usable; redirects are not followed.
    pub fn is_success_or_redirect(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

/// Sends a registration `POST`.
///
/// Implementations must not follow redirects, and must surface timeouts as
/// `TransportError::Timeout`.
#[async_trait]
pub trait RegistrationTransport: Send + Sync {
    async fn post(
        &self,
        uri: &Url,
        request_headers: &[(&'static str, String)],
    ) -> Result<TransportResponse, TransportError>;
}

/// Production transport on a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Arc<reqwest::Client>,
}

impl ReqwestTransport {
    /// Builds a client from `options` with redirects disabled.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if the client cannot be
    /// built.
    pub fn new(options: &ClientOptions) -> Result<Self, InitializationError> {
        Ok(Self {
            client: init_client(options)?,
        })
    }

    /// Wraps an existing client. It should have redirects disabled.
    pub fn from_client(client: Arc<reqwest::Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RegistrationTransport for ReqwestTransport {
    async fn post(
        &self,
        uri: &Url,
        request_headers: &[(&'static str, String)],
    ) -> Result<TransportResponse, TransportError> {
        let mut request = self.client.post(uri.clone());
        for (name, value) in request_headers {
            request = request.header(*name, value);
        }
        let response = request.send().await.map_err(|e| {
            let error = categorize_reqwest_error(&e);
            log::debug!("Registration request to {uri} failed: {e}");
            error
        })?;
        Ok(TransportResponse {
            status: response.status().as_u16(),
            headers: ResponseHeaders::from(response.headers()),
        })
    }
}
