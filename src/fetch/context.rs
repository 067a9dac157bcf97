//! Shared resources and steps of a registration fetch.
//!
//! `FetchContext` groups everything a fetch needs besides the request itself,
//! and runs the part of a fetch that does not depend on the registration
//! type: URL check, round trip, redirects, enrollment and header lookup.

use std::sync::Arc;

use chrono::Utc;

use super::redirects::{parse_redirects, RedirectAccumulator};
use super::transport::RegistrationTransport;
use super::FetchStatus;
use crate::config::{MeasurementConfig, FAKE_ENROLLMENT};
use crate::enrollment::EnrollmentResolver;
use crate::error_handling::{EntityStatus, RegistrationError, ResponseStatus};
use crate::models::RegistrationDescriptor;
use crate::telemetry::{emit_header_metrics, RegistrationLogger};

/// A registration header ready for parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchedPayload {
    pub enrollment_id: String,
    pub header: String,
}

/// Context containing the collaborators of a fetcher.
pub(crate) struct FetchContext<T> {
    pub transport: T,
    pub config: MeasurementConfig,
    pub enrollment: Arc<dyn EnrollmentResolver>,
    pub logger: Arc<dyn RegistrationLogger>,
}

impl<T: RegistrationTransport> FetchContext<T> {
    pub fn new(
        transport: T,
        config: MeasurementConfig,
        enrollment: Arc<dyn EnrollmentResolver>,
        logger: Arc<dyn RegistrationLogger>,
    ) -> Self {
        Self {
            transport,
            config,
            enrollment,
            logger,
        }
    }

    /// Runs the round trip and returns the payload header, if any.
    ///
    /// Every early exit leaves its reason in `status`. Redirects are added to
    /// `redirects` whenever a response arrived, whatever its status code.
    pub async fn fetch_payload(
        &self,
        descriptor: &RegistrationDescriptor,
        payload_header: &str,
        request_headers: &[(&'static str, String)],
        status: &mut FetchStatus,
        redirects: &mut RedirectAccumulator,
    ) -> Option<FetchedPayload> {
        status.retry_count = descriptor.retry_count();

        let uri = descriptor.registration_uri();
        let has_host = uri.host_str().is_some_and(|host| !host.is_empty());
        if uri.scheme() != "https" || !has_host {
            log::debug!("Invalid registration URI {uri}");
            status.response_status = Some(ResponseStatus::InvalidUrl);
            return None;
        }

        let result = self.transport.post(uri, request_headers).await;
        status.registration_delay = Utc::now().timestamp_millis() - descriptor.request_time();
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Registration fetch from {uri} failed: {e}");
                status.response_status = Some(ResponseStatus::NetworkError);
                return None;
            }
        };

        status.response_size = response.headers.characters_len();
        let hop_redirects = parse_redirects(&response.headers);
        let has_redirects = hop_redirects.values().any(|uris| !uris.is_empty());
        redirects.extend_from(hop_redirects);

        if !response.is_success_or_redirect() {
            log::debug!(
                "Registration fetch from {uri} returned status {}",
                response.status
            );
            status.response_status = Some(ResponseStatus::ServerUnavailable);
            return None;
        }
        status.response_status = Some(ResponseStatus::Success);

        let enrollment_id = if self.config.disable_enrollment_check {
            Some(FAKE_ENROLLMENT.to_string())
        } else {
            self.enrollment.resolve(uri)
        };
        let Some(enrollment_id) = enrollment_id else {
            log::debug!("No enrollment for registration URI {uri}");
            status.entity_status = Some(EntityStatus::InvalidEnrollment);
            return None;
        };

        let Some(header) = response.headers.first(payload_header) else {
            log::debug!("{payload_header} missing from {uri} response");
            status.entity_status = Some(EntityStatus::HeaderMissing);
            status.redirect_only = has_redirects;
            return None;
        };

        Some(FetchedPayload {
            enrollment_id,
            header: header.to_string(),
        })
    }

    /// Records the parser outcome and emits header telemetry on success.
    pub fn finish<R>(
        &self,
        descriptor: &RegistrationDescriptor,
        status: &mut FetchStatus,
        parsed: Result<R, RegistrationError>,
    ) -> Option<R> {
        match parsed {
            Ok(record) => {
                status.entity_status = Some(EntityStatus::Success);
                emit_header_metrics(
                    self.config.max_response_based_registration_payload_size_bytes,
                    self.logger.as_ref(),
                    descriptor,
                    status,
                );
                Some(record)
            }
            Err(e) => {
                log::debug!(
                    "Rejected registration from {}: {e}",
                    descriptor.registration_uri()
                );
                status.entity_status = Some(e.entity_status());
                None
            }
        }
    }
}
