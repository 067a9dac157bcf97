use std::sync::Arc;

use super::context::FetchContext;
use super::redirects::RedirectAccumulator;
use super::transport::RegistrationTransport;
use super::FetchStatus;
use crate::config::{MeasurementConfig, HEADER_REGISTER_TRIGGER};
use crate::enrollment::EnrollmentResolver;
use crate::models::{RegistrationDescriptor, Trigger};
use crate::parse::parse_trigger;
use crate::telemetry::RegistrationLogger;

/// Fetches and validates trigger registrations.
pub struct TriggerFetcher<T> {
    context: FetchContext<T>,
}

impl<T: RegistrationTransport> TriggerFetcher<T> {
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

    /// Fetches one trigger registration. See
    /// [`SourceFetcher::fetch_source`](super::SourceFetcher::fetch_source).
    pub async fn fetch_trigger(
        &self,
        descriptor: &RegistrationDescriptor,
        status: &mut FetchStatus,
        redirects: &mut RedirectAccumulator,
    ) -> Option<Trigger> {
        let payload = self
            .context
            .fetch_payload(descriptor, HEADER_REGISTER_TRIGGER, &[], status, redirects)
            .await?;

        let parsed = parse_trigger(
            descriptor,
            &payload.enrollment_id,
            &payload.header,
            self.config(),
        );
        self.context.finish(descriptor, status, parsed)
    }
}
