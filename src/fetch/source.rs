use std::sync::Arc;

use super::context::FetchContext;
use super::redirects::RedirectAccumulator;
use super::transport::RegistrationTransport;
use super::FetchStatus;
use crate::config::{MeasurementConfig, HEADER_REGISTER_SOURCE, HEADER_SOURCE_INFO};
use crate::enrollment::EnrollmentResolver;
use crate::models::{RegistrationDescriptor, Source};
use crate::parse::{parse_source, ParsingMode};
use crate::telemetry::RegistrationLogger;

/// Fetches and validates source registrations.
pub struct SourceFetcher<T> {
    context: FetchContext<T>,
}

impl<T: RegistrationTransport> SourceFetcher<T> {
    pub fn new(
        transport: T,
        config: MeasurementConfig,
        enrollment: Arc<dyn EnrollmentResolver>,
        logger: Arc<dyn RegistrationLogger>,
    ) -> Self {
        Self {
            context: FetchContext::new(transport, config, enrollment, logger),
        }
    }

    pub fn config(&self) -> &MeasurementConfig {
        &self.context.config
    }

    /// Fetches one source registration.
    ///
    /// Returns the validated source, or `None` with the reason recorded in
    /// `status`. Redirects announced by the response are appended to
    /// `redirects` in both cases.
    pub async fn fetch_source(
        &self,
        descriptor: &RegistrationDescriptor,
        status: &mut FetchStatus,
        redirects: &mut RedirectAccumulator,
    ) -> Option<Source> {
        let request_headers: Vec<(&'static str, String)> = descriptor
            .source_type()
            .map(|source_type| (HEADER_SOURCE_INFO, source_type.as_str().to_string()))
            .into_iter()
            .collect();

        let payload = self
            .context
            .fetch_payload(
                descriptor,
                HEADER_REGISTER_SOURCE,
                &request_headers,
                status,
                redirects,
            )
            .await?;

        log::debug!(
            "Parsing source from {} in {:?} mode",
            descriptor.registration_uri(),
            ParsingMode::from_config(self.config())
        );
        let parsed = parse_source(
            descriptor,
            &payload.enrollment_id,
            &payload.header,
            self.config(),
        );
        self.context.finish(descriptor, status, parsed)
    }
}
