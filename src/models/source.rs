//! Validated source registration record.

use url::Url;

use super::descriptor::{EventSurfaceType, SourceType};
use crate::error_handling::RecordError;
use crate::numeric::UnsignedLong;

/// A validated attribution source.
///
/// Times are epoch milliseconds; windows are durations in milliseconds. JSON
/// valued fields hold their normalized serialized form.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub registration_id: String,
    /// Base URI of the top origin
    pub publisher: String,
    pub publisher_type: EventSurfaceType,
    pub enrollment_id: String,
    pub registrant: Url,
    pub source_type: SourceType,
    pub event_id: UnsignedLong,
    pub event_time: i64,
    pub expiry_time: i64,
    pub event_report_window: Option<i64>,
    pub aggregatable_report_window: i64,
    pub priority: i64,
    pub is_debug_reporting: bool,
    pub debug_key: Option<UnsignedLong>,
    pub install_attribution_window: i64,
    pub install_cooldown_window: i64,
    pub filter_data: Option<String>,
    pub app_destinations: Vec<String>,
    pub web_destinations: Vec<String>,
    pub registration_origin: String,
    pub aggregate_source: Option<String>,
    pub shared_aggregation_keys: Option<String>,
    pub shared_filter_data_keys: Option<String>,
    pub debug_join_key: Option<String>,
    pub debug_ad_id: Option<String>,
    pub platform_ad_id: Option<String>,
    pub ad_id_permission: bool,
    pub ar_debug_permission: bool,
    pub coarse_event_report_destinations: bool,
    pub shared_debug_key: Option<UnsignedLong>,
    pub max_event_level_reports: Option<i64>,
    /// `{"start_time": ms, "end_times": [ms, ...]}`, relative to `event_time`
    pub event_report_windows: Option<String>,
}

/// Accumulates [`Source`] fields while a payload is parsed.
///
/// Optional fields default to absent or zero; [`SourceBuilder::build`] checks
/// the required ones.
#[derive(Debug, Clone, Default)]
pub struct SourceBuilder {
    pub registration_id: String,
    pub publisher: Option<String>,
    pub publisher_type: Option<EventSurfaceType>,
    pub enrollment_id: Option<String>,
    pub registrant: Option<Url>,
    pub source_type: Option<SourceType>,
    pub event_id: UnsignedLong,
    pub event_time: i64,
    pub expiry_time: i64,
    pub event_report_window: Option<i64>,
    pub aggregatable_report_window: i64,
    pub priority: i64,
    pub is_debug_reporting: bool,
    pub debug_key: Option<UnsignedLong>,
    pub install_attribution_window: i64,
    pub install_cooldown_window: i64,
    pub filter_data: Option<String>,
    pub app_destinations: Vec<String>,
    pub web_destinations: Vec<String>,
    pub registration_origin: Option<String>,
    pub aggregate_source: Option<String>,
    pub shared_aggregation_keys: Option<String>,
    pub shared_filter_data_keys: Option<String>,
    pub debug_join_key: Option<String>,
    pub debug_ad_id: Option<String>,
    pub platform_ad_id: Option<String>,
    pub ad_id_permission: bool,
    pub ar_debug_permission: bool,
    pub coarse_event_report_destinations: bool,
    pub shared_debug_key: Option<UnsignedLong>,
    pub max_event_level_reports: Option<i64>,
    pub event_report_windows: Option<String>,
}

impl SourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// `RecordError::MissingField` for an absent registration origin,
    /// enrollment id, publisher, registrant or source type, or when neither an
    /// app nor a web destination was set.
    pub fn build(self) -> Result<Source, RecordError> {
        let registration_origin = self
            .registration_origin
            .ok_or(RecordError::MissingField("registration_origin"))?;
        let enrollment_id = self
            .enrollment_id
            .ok_or(RecordError::MissingField("enrollment_id"))?;
        let publisher = self.publisher.ok_or(RecordError::MissingField("publisher"))?;
        let registrant = self
            .registrant
            .ok_or(RecordError::MissingField("registrant"))?;
        let source_type = self
            .source_type
            .ok_or(RecordError::MissingField("source_type"))?;
        if self.app_destinations.is_empty() && self.web_destinations.is_empty() {
            return Err(RecordError::MissingField("destination"));
        }
        Ok(Source {
            registration_id: self.registration_id,
            publisher,
            publisher_type: self.publisher_type.unwrap_or(EventSurfaceType::App),
            enrollment_id,
            registrant,
            source_type,
            event_id: self.event_id,
            event_time: self.event_time,
            expiry_time: self.expiry_time,
            event_report_window: self.event_report_window,
            aggregatable_report_window: self.aggregatable_report_window,
            priority: self.priority,
            is_debug_reporting: self.is_debug_reporting,
            debug_key: self.debug_key,
            install_attribution_window: self.install_attribution_window,
            install_cooldown_window: self.install_cooldown_window,
            filter_data: self.filter_data,
            app_destinations: self.app_destinations,
            web_destinations: self.web_destinations,
            registration_origin,
            aggregate_source: self.aggregate_source,
            shared_aggregation_keys: self.shared_aggregation_keys,
            shared_filter_data_keys: self.shared_filter_data_keys,
            debug_join_key: self.debug_join_key,
            debug_ad_id: self.debug_ad_id,
            platform_ad_id: self.platform_ad_id,
            ad_id_permission: self.ad_id_permission,
            ar_debug_permission: self.ar_debug_permission,
            coarse_event_report_destinations: self.coarse_event_report_destinations,
            shared_debug_key: self.shared_debug_key,
            max_event_level_reports: self.max_event_level_reports,
            event_report_windows: self.event_report_windows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> SourceBuilder {
        SourceBuilder {
            registration_origin: Some("https://ad-tech.test".into()),
            enrollment_id: Some("enrollment-1".into()),
            publisher: Some("android-app://com.publisher".into()),
            registrant: Some(Url::parse("android-app://com.publisher").unwrap()),
            source_type: Some(SourceType::Navigation),
            app_destinations: vec!["android-app://com.advertiser".into()],
            ..SourceBuilder::new()
        }
    }

    #[test]
    fn test_build_complete_source() {
        let source = complete_builder().build().expect("source should build");
        assert_eq!(source.enrollment_id, "enrollment-1");
        assert_eq!(source.publisher_type, EventSurfaceType::App);
        assert_eq!(source.event_id, UnsignedLong::ZERO);
    }

    #[test]
    fn test_build_requires_enrollment() {
        let builder = SourceBuilder {
            enrollment_id: None,
            ..complete_builder()
        };
        assert_eq!(
            builder.build(),
            Err(RecordError::MissingField("enrollment_id"))
        );
    }

    #[test]
    fn test_build_requires_a_destination() {
        let builder = SourceBuilder {
            app_destinations: Vec::new(),
            ..complete_builder()
        };
        assert_eq!(builder.build(), Err(RecordError::MissingField("destination")));
    }
}
