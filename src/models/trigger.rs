//! Validated trigger registration record.

use url::Url;

use super::descriptor::EventSurfaceType;
use crate::error_handling::RecordError;
use crate::numeric::UnsignedLong;

/// A validated attribution trigger.
///
/// JSON valued fields hold their normalized serialized form: filters are
/// always the wrapped array-of-maps form, and `event_triggers` is `"[]"` when
/// the payload had no event trigger data.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub attribution_destination: String,
    pub destination_type: EventSurfaceType,
    pub registrant: Url,
    /// Epoch milliseconds
    pub trigger_time: i64,
    pub registration_origin: String,
    pub enrollment_id: String,
    pub event_triggers: String,
    pub aggregate_trigger_data: Option<String>,
    pub aggregate_values: Option<String>,
    pub aggregate_deduplication_keys: Option<String>,
    pub filters: Option<String>,
    pub not_filters: Option<String>,
    pub attribution_config: Option<String>,
    pub adtech_key_mapping: Option<String>,
    pub debug_key: Option<UnsignedLong>,
    pub debug_join_key: Option<String>,
    pub debug_ad_id: Option<String>,
    pub platform_ad_id: Option<String>,
    pub is_debug_reporting: bool,
    pub ad_id_permission: bool,
    pub ar_debug_permission: bool,
    pub aggregation_coordinator_origin: Option<String>,
}

impl Trigger {
    /// `event_triggers` decoded back into JSON.
    pub fn event_triggers_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.event_triggers)
    }
}

/// Accumulates [`Trigger`] fields while a payload is parsed.
#[derive(Debug, Clone, Default)]
pub struct TriggerBuilder {
    pub attribution_destination: Option<String>,
    pub destination_type: Option<EventSurfaceType>,
    pub registrant: Option<Url>,
    pub trigger_time: i64,
    pub registration_origin: Option<String>,
    pub enrollment_id: Option<String>,
    pub event_triggers: Option<String>,
    pub aggregate_trigger_data: Option<String>,
    pub aggregate_values: Option<String>,
    pub aggregate_deduplication_keys: Option<String>,
    pub filters: Option<String>,
    pub not_filters: Option<String>,
    pub attribution_config: Option<String>,
    pub adtech_key_mapping: Option<String>,
    pub debug_key: Option<UnsignedLong>,
    pub debug_join_key: Option<String>,
    pub debug_ad_id: Option<String>,
    pub platform_ad_id: Option<String>,
    pub is_debug_reporting: bool,
    pub ad_id_permission: bool,
    pub ar_debug_permission: bool,
    pub aggregation_coordinator_origin: Option<String>,
}

impl TriggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// `RecordError::MissingField` for an absent attribution destination,
    /// registration origin, enrollment id or registrant.
    pub fn build(self) -> Result<Trigger, RecordError> {
        let attribution_destination = self
            .attribution_destination
            .ok_or(RecordError::MissingField("attribution_destination"))?;
        let registration_origin = self
            .registration_origin
            .ok_or(RecordError::MissingField("registration_origin"))?;
        let enrollment_id = self
            .enrollment_id
            .ok_or(RecordError::MissingField("enrollment_id"))?;
        let registrant = self
            .registrant
            .ok_or(RecordError::MissingField("registrant"))?;
        Ok(Trigger {
            attribution_destination,
            destination_type: self.destination_type.unwrap_or(EventSurfaceType::App),
            registrant,
            trigger_time: self.trigger_time,
            registration_origin,
            enrollment_id,
            event_triggers: self.event_triggers.unwrap_or_else(|| "[]".to_string()),
            aggregate_trigger_data: self.aggregate_trigger_data,
            aggregate_values: self.aggregate_values,
            aggregate_deduplication_keys: self.aggregate_deduplication_keys,
            filters: self.filters,
            not_filters: self.not_filters,
            attribution_config: self.attribution_config,
            adtech_key_mapping: self.adtech_key_mapping,
            debug_key: self.debug_key,
            debug_join_key: self.debug_join_key,
            debug_ad_id: self.debug_ad_id,
            platform_ad_id: self.platform_ad_id,
            is_debug_reporting: self.is_debug_reporting,
            ad_id_permission: self.ad_id_permission,
            ar_debug_permission: self.ar_debug_permission,
            aggregation_coordinator_origin: self.aggregation_coordinator_origin,
        })
    }
}
