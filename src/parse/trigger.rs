//! `Attribution-Reporting-Register-Trigger` payload parsing.

use serde_json::{Map, Value};

use super::aggregate::{
    parse_aggregatable_values, parse_aggregate_deduplication_keys, parse_aggregate_trigger_data,
    wrap_filter_pair,
};
use super::debug::{debug_ad_id, debug_join_key, debug_key, debug_reporting};
use super::json::{
    coerce_long, coerce_unsigned_long, extract_long, extract_unsigned_long,
    field, get_array, parse_object,
};
use super::xna::{is_xna_allowed, parse_attribution_config, parse_x_network_key_mapping};
use super::{request_registration_origin, ParsingMode};
use crate::config::common::{DEDUPLICATION_KEY, FILTERS, NOT_FILTERS, PRIORITY};
use crate::config::trigger::{
    AGGREGATABLE_DEDUPLICATION_KEYS, AGGREGATABLE_TRIGGER_DATA, AGGREGATABLE_VALUES,
    AGGREGATION_COORDINATOR_ORIGIN, ATTRIBUTION_CONFIG, EVENT_TRIGGER_DATA, TRIGGER_DATA, VALUE,
    X_NETWORK_KEY_MAPPING,
};
use crate::config::MeasurementConfig;
use crate::enrollment::AllowList;
use crate::error_handling::{JsonError, RegistrationError};
use crate::filters::{wrap_and_validate_filters, FilterContext};
use crate::models::{EventSurfaceType, RegistrationDescriptor, RegistrationType, Trigger, TriggerBuilder};
use crate::numeric::UnsignedLong;
use crate::web::{base_uri, uri_without_root_path};

/// Parses and validates a trigger registration header.
///
/// # Arguments
///
/// * `descriptor` - The registration request the header answered
/// * `enrollment_id` - Enrollment resolved for the registration origin
/// * `header` - Raw `Attribution-Reporting-Register-Trigger` value
/// * `config` - Limits and feature flags
///
/// # Errors
///
/// `RegistrationError::Parsing` for malformed JSON or a structural type
/// mismatch (including anywhere inside `attribution_config`).
/// `RegistrationError::Validation` for any other rule violation.
pub fn parse_trigger(
    descriptor: &RegistrationDescriptor,
    enrollment_id: &str,
    header: &str,
    config: &MeasurementConfig,
) -> Result<Trigger, RegistrationError> {
    let mode = ParsingMode::from_config(config);
    let json = parse_object(header)?;
    let filter_context = FilterContext::for_trigger(config);

    let mut builder = TriggerBuilder::new();
    builder.attribution_destination = Some(attribution_destination(descriptor)?);
    builder.destination_type = Some(EventSurfaceType::from(descriptor.registration_type()));
    builder.registrant = Some(descriptor.registrant().clone());
    builder.trigger_time = descriptor.request_time();
    builder.registration_origin = Some(request_registration_origin(descriptor)?);
    builder.enrollment_id = Some(enrollment_id.to_string());

    if let Some(entries) = get_array(&json, EVENT_TRIGGER_DATA)? {
        let event_triggers = parse_event_trigger_data(entries, mode, &filter_context)?;
        builder.event_triggers = Some(event_triggers.to_string());
    }

    if let Some(entries) = get_array(&json, AGGREGATABLE_TRIGGER_DATA)? {
        let trigger_data = parse_aggregate_trigger_data(entries, mode, &filter_context)?;
        builder.aggregate_trigger_data = Some(trigger_data.to_string());
    }

    if let Some(values) = field(&json, AGGREGATABLE_VALUES) {
        builder.aggregate_values = Some(parse_aggregatable_values(values, mode, config)?);
    }

    if let Some(entries) = get_array(&json, AGGREGATABLE_DEDUPLICATION_KEYS)? {
        let keys = parse_aggregate_deduplication_keys(entries, mode, &filter_context)?;
        builder.aggregate_deduplication_keys = Some(keys.to_string());
    }

    if field(&json, FILTERS).is_some() {
        builder.filters =
            Some(wrap_and_validate_filters(&json, FILTERS, &filter_context)?.to_string());
    }
    if field(&json, NOT_FILTERS).is_some() {
        builder.not_filters =
            Some(wrap_and_validate_filters(&json, NOT_FILTERS, &filter_context)?.to_string());
    }

    builder.is_debug_reporting = debug_reporting(&json);
    builder.debug_key = debug_key(&json);
    builder.debug_join_key = debug_join_key(&json, enrollment_id, config);
    builder.debug_ad_id = debug_ad_id(&json, enrollment_id, descriptor, config);
    builder.platform_ad_id = descriptor.platform_ad_id().map(str::to_string);
    builder.ad_id_permission = descriptor.ad_id_permission();
    builder.ar_debug_permission = descriptor.debug_key_allowed();

    if is_xna_allowed(descriptor, config) {
        if let Some(attribution_config) = field(&json, ATTRIBUTION_CONFIG) {
            let parsed = parse_attribution_config(attribution_config, &filter_context)?;
            builder.attribution_config = Some(parsed.to_string());
        }
        if let Some(mapping) = field(&json, X_NETWORK_KEY_MAPPING) {
            builder.adtech_key_mapping =
                parse_x_network_key_mapping(mapping)?.map(|mapping| mapping.to_string());
        }
    }

    if config.aggregation_coordinator_origin_enabled {
        if let Some(origin) = field(&json, AGGREGATION_COORDINATOR_ORIGIN) {
            builder.aggregation_coordinator_origin =
                Some(parse_coordinator_origin(origin, config)?);
        }
    }

    Ok(builder.build()?)
}

/// App triggers attribute to the app's base URI; web triggers to the top
/// origin as given.
fn attribution_destination(descriptor: &RegistrationDescriptor) -> Result<String, RegistrationError> {
    let top_origin = descriptor.top_origin();
    if descriptor.registration_type() == RegistrationType::WebTrigger {
        return Ok(uri_without_root_path(top_origin));
    }
    base_uri(top_origin).ok_or_else(|| {
        RegistrationError::validation(format!("top origin has no base URI: {top_origin}"))
    })
}

/// Validates `event_trigger_data` and returns the normalized array.
///
/// Each output entry carries `trigger_data` (always), `priority`, `value` and
/// `deduplication_key` as decimal strings, and wrapped `filters` /
/// `not_filters`.
fn parse_event_trigger_data(
    entries: &[Value],
    mode: ParsingMode,
    filter_context: &FilterContext<'_>,
) -> Result<Value, RegistrationError> {
    let mut normalized = Vec::with_capacity(entries.len());
    for entry in entries {
        let Value::Object(entry) = entry else {
            if mode.is_aligned_v1() {
                return Err(RegistrationError::validation(format!(
                    "event trigger data entry is not an object: {entry}"
                )));
            }
            log::debug!("Skipping event trigger data entry that is not an object: {entry}");
            continue;
        };
        normalized.push(Value::Object(parse_event_trigger_entry(
            entry,
            mode,
            filter_context,
        )?));
    }
    Ok(Value::Array(normalized))
}

fn parse_event_trigger_entry(
    entry: &Map<String, Value>,
    mode: ParsingMode,
    filter_context: &FilterContext<'_>,
) -> Result<Map<String, Value>, RegistrationError> {
    let mut out = Map::new();

    let trigger_data = match field(entry, TRIGGER_DATA) {
        None => UnsignedLong::ZERO,
        Some(raw) => match mode {
            ParsingMode::Legacy => coerce_unsigned_long(raw).unwrap_or_else(|| {
                log::debug!("Invalid trigger_data {raw}, using 0");
                UnsignedLong::ZERO
            }),
            ParsingMode::AlignedV1 => extract_unsigned_long(raw).ok_or_else(|| {
                RegistrationError::validation(format!("invalid trigger_data {raw}"))
            })?,
        },
    };
    out.insert(TRIGGER_DATA.to_string(), Value::String(trigger_data.to_string()));

    for key in [PRIORITY, VALUE] {
        if let Some(raw) = field(entry, key) {
            let parsed = match mode {
                ParsingMode::Legacy => coerce_long(raw),
                ParsingMode::AlignedV1 => extract_long(raw),
            };
            insert_or_reject(&mut out, key, raw, parsed.map(|v| v.to_string()), mode)?;
        }
    }

    if let Some(raw) = field(entry, DEDUPLICATION_KEY) {
        let parsed = match mode {
            ParsingMode::Legacy => coerce_unsigned_long(raw),
            ParsingMode::AlignedV1 => extract_unsigned_long(raw),
        };
        insert_or_reject(
            &mut out,
            DEDUPLICATION_KEY,
            raw,
            parsed.map(|key| key.to_string()),
            mode,
        )?;
    }

    wrap_filter_pair(entry, &mut out, filter_context)?;
    Ok(out)
}

/// Stores a parsed field, or applies the mode's policy for an invalid one:
/// legacy drops the field, aligned-v1 rejects the registration.
fn insert_or_reject(
    out: &mut Map<String, Value>,
    key: &str,
    raw: &Value,
    parsed: Option<String>,
    mode: ParsingMode,
) -> Result<(), RegistrationError> {
    match parsed {
        Some(parsed) => {
            out.insert(key.to_string(), Value::String(parsed));
            Ok(())
        }
        None if mode.is_aligned_v1() => Err(RegistrationError::validation(format!(
            "invalid {key} {raw}"
        ))),
        None => {
            log::debug!("Dropping invalid {key} {raw}");
            Ok(())
        }
    }
}

fn parse_coordinator_origin(
    origin: &Value,
    config: &MeasurementConfig,
) -> Result<String, RegistrationError> {
    let Value::String(origin) = origin else {
        return Err(JsonError::wrong_type(AGGREGATION_COORDINATOR_ORIGIN, "a string").into());
    };
    let allowlist = AllowList::parse(&config.aggregation_coordinator_origin_allowlist);
    if origin.is_empty() || !allowlist.allows(origin) {
        return Err(RegistrationError::validation(format!(
            "aggregation coordinator origin `{origin}` is not allowed"
        )));
    }
    Ok(origin.clone())
}
