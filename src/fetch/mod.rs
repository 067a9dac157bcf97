//! Registration fetching.
//!
//! This module handles:
//! - The HTTP round trip through a [`RegistrationTransport`]
//! - Response header access and redirect collection
//! - Enrollment resolution and payload header lookup
//! - Handing the payload to the source or trigger parser
//!
//! A fetch never follows redirects itself and never fails with an error: the
//! outcome of every step is recorded in a [`FetchStatus`].

mod context;
mod headers;
mod redirects;
mod source;
mod transport;
mod trigger;

pub use headers::ResponseHeaders;
pub use redirects::{parse_redirects, RedirectAccumulator, RedirectKind};
pub use source::SourceFetcher;
pub use transport::{RegistrationTransport, ReqwestTransport, TransportResponse};
pub use trigger::TriggerFetcher;

use crate::error_handling::{EntityStatus, ResponseStatus};

/// Outcome of one fetch.
///
/// `response_status` describes the HTTP exchange; `entity_status` is only set
/// once a usable response arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchStatus {
    pub response_status: Option<ResponseStatus>,
    pub entity_status: Option<EntityStatus>,
    /// Characters across all response header names and values
    pub response_size: u64,
    /// Milliseconds between the registration request and the response
    pub registration_delay: i64,
    pub retry_count: u32,
    /// The response carried redirects but no payload header
    pub redirect_only: bool,
}

impl FetchStatus {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
