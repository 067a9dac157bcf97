//! Registration response size telemetry.
//!
//! The sink is an external collaborator; the crate only decides what goes into
//! each event. The ad-tech origin is attached only to oversized responses.

use crate::fetch::FetchStatus;
use crate::models::{RegistrationDescriptor, RegistrationType};
use crate::web::registration_origin;

/// One registration-response-size event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationResponseStats {
    pub registration_type: RegistrationType,
    /// Header characters, see [`crate::fetch::ResponseHeaders::characters_len`]
    pub response_size: u64,
    /// Registration origin, only for responses above the configured maximum
    pub ad_tech_domain: Option<String>,
}

/// Fire-and-forget telemetry sink.
pub trait RegistrationLogger: Send + Sync {
    fn log_registration_response_size(&self, stats: &RegistrationResponseStats);
}

/// Writes each event as an `info` log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRegistrationLogger;

impl RegistrationLogger for LogRegistrationLogger {
    fn log_registration_response_size(&self, stats: &RegistrationResponseStats) {
        log::info!(
            "registration_response_size type={} size={} ad_tech_domain={}",
            stats.registration_type.as_str(),
            stats.response_size,
            stats.ad_tech_domain.as_deref().unwrap_or("-")
        );
    }
}

/// Reports the response size of a completed fetch.
///
/// # Arguments
///
/// * `max_allowed_size` - Sizes strictly above this carry the ad-tech origin
/// * `logger` - Telemetry sink
/// * `descriptor` - The registration that was fetched
/// * `status` - Status holding the measured response size
pub fn emit_header_metrics(
    max_allowed_size: u64,
    logger: &dyn RegistrationLogger,
    descriptor: &RegistrationDescriptor,
    status: &FetchStatus,
) {
    let ad_tech_domain = if status.response_size > max_allowed_size {
        registration_origin(descriptor.registration_uri())
    } else {
        None
    };
    logger.log_registration_response_size(&RegistrationResponseStats {
        registration_type: descriptor.registration_type(),
        response_size: status.response_size,
        ad_tech_domain,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use url::Url;

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<RegistrationResponseStats>>,
    }

    impl RegistrationLogger for RecordingLogger {
        fn log_registration_response_size(&self, stats: &RegistrationResponseStats) {
            self.events.lock().unwrap().push(stats.clone());
        }
    }

    fn descriptor() -> RegistrationDescriptor {
        RegistrationDescriptor::builder(
            RegistrationType::AppTrigger,
            Url::parse("https://ad-tech.test:8081/register?x=1").unwrap(),
            Url::parse("android-app://com.advertiser").unwrap(),
            Url::parse("android-app://com.advertiser").unwrap(),
        )
        .build()
        .unwrap()
    }

    #[test]
    fn test_emit_within_limit_has_no_domain() {
        let logger = RecordingLogger::default();
        let status = FetchStatus {
            response_size: 5,
            ..FetchStatus::default()
        };
        emit_header_metrics(5, &logger, &descriptor(), &status);

        let events = logger.events.lock().unwrap();
        assert_eq!(
            events.as_slice(),
            &[RegistrationResponseStats {
                registration_type: RegistrationType::AppTrigger,
                response_size: 5,
                ad_tech_domain: None,
            }]
        );
    }

    #[test]
    fn test_emit_above_limit_attaches_origin() {
        let logger = RecordingLogger::default();
        let status = FetchStatus {
            response_size: 6,
            ..FetchStatus::default()
        };
        emit_header_metrics(5, &logger, &descriptor(), &status);

        let events = logger.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].ad_tech_domain.as_deref(),
            Some("https://ad-tech.test:8081")
        );
    }
}
