//! Cross-network attribution (XNA) trigger fields.
//!
//! `attribution_config` lets a trigger registered by one ad tech be attributed
//! to sources registered by another network; `x_network_key_mapping` maps each
//! network to the key offset it contributes to aggregate keys.

use serde_json::{Map, Value};

use super::json::{coerce_long, field};
use crate::config::attribution_config::{
    END, EXPIRY, FILTER_DATA, POST_INSTALL_EXCLUSIVITY_WINDOW, PRIORITY, SOURCE_EXPIRY_OVERRIDE,
    SOURCE_FILTERS, SOURCE_NETWORK, SOURCE_NOT_FILTERS, SOURCE_PRIORITY_RANGE, START,
};
use crate::config::trigger::{ATTRIBUTION_CONFIG, X_NETWORK_KEY_MAPPING};
use crate::config::MeasurementConfig;
use crate::enrollment::AllowList;
use crate::error_handling::{JsonError, RegistrationError};
use crate::filters::{wrap_and_validate_filters, FilterContext};
use crate::models::{RegistrationDescriptor, RegistrationType};
use crate::web::package_name;

/// Whether XNA fields are honored for this trigger registration.
///
/// Web triggers additionally need their registrant app in the web-context
/// client allowlist.
pub(crate) fn is_xna_allowed(descriptor: &RegistrationDescriptor, config: &MeasurementConfig) -> bool {
    if !config.enable_xna {
        return false;
    }
    if descriptor.registration_type() != RegistrationType::WebTrigger {
        return true;
    }
    let allowlist = AllowList::parse(&config.web_context_client_app_allowlist);
    package_name(descriptor.registrant()).is_some_and(|package| allowlist.contains_exact(package))
}

/// Validates `attribution_config` and returns the normalized entries.
///
/// # Errors
///
/// Any structural problem in any entry is a `RegistrationError::Parsing` and
/// rejects the whole trigger. Filter rule violations are
/// `RegistrationError::Validation`.
pub(crate) fn parse_attribution_config(
    value: &Value,
    filter_context: &FilterContext<'_>,
) -> Result<Value, RegistrationError> {
    let Value::Array(entries) = value else {
        return Err(JsonError::wrong_type(ATTRIBUTION_CONFIG, "an array").into());
    };
    entries
        .iter()
        .map(|entry| match entry {
            Value::Object(entry) => parse_attribution_config_entry(entry, filter_context),
            _ => Err(JsonError::wrong_type(ATTRIBUTION_CONFIG, "an array of objects").into()),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn parse_attribution_config_entry(
    entry: &Map<String, Value>,
    filter_context: &FilterContext<'_>,
) -> Result<Value, RegistrationError> {
    let mut out = Map::new();

    match field(entry, SOURCE_NETWORK) {
        Some(Value::String(network)) => {
            out.insert(SOURCE_NETWORK.to_string(), Value::String(network.clone()));
        }
        Some(_) => return Err(JsonError::wrong_type(SOURCE_NETWORK, "a string").into()),
        None => return Err(JsonError::MissingField(SOURCE_NETWORK.to_string()).into()),
    }

    let range = match field(entry, SOURCE_PRIORITY_RANGE) {
        Some(Value::Object(range)) => range,
        Some(_) => return Err(JsonError::wrong_type(SOURCE_PRIORITY_RANGE, "an object").into()),
        None => return Err(JsonError::MissingField(SOURCE_PRIORITY_RANGE.to_string()).into()),
    };
    let start = required_long(range, START)?;
    let end = required_long(range, END)?;
    let mut normalized = Map::new();
    normalized.insert(START.to_string(), Value::from(start));
    normalized.insert(END.to_string(), Value::from(end));
    out.insert(SOURCE_PRIORITY_RANGE.to_string(), Value::Object(normalized));

    for key in [SOURCE_FILTERS, SOURCE_NOT_FILTERS] {
        if field(entry, key).is_some() {
            out.insert(
                key.to_string(),
                wrap_and_validate_filters(entry, key, filter_context)?,
            );
        }
    }

    for key in [SOURCE_EXPIRY_OVERRIDE, PRIORITY, EXPIRY] {
        if let Some(value) = optional_long(entry, key)? {
            out.insert(key.to_string(), Value::from(value));
        }
    }

    if let Some(filter_data) = field(entry, FILTER_DATA) {
        let Value::Object(filter_map) = filter_data else {
            return Err(JsonError::wrong_type(FILTER_DATA, "an object").into());
        };
        if !FilterContext::for_source(filter_context.config).is_valid_map(filter_map) {
            return Err(RegistrationError::validation(
                "invalid filter_data in attribution_config",
            ));
        }
        out.insert(FILTER_DATA.to_string(), filter_data.clone());
    }

    if let Some(window) = optional_long(entry, POST_INSTALL_EXCLUSIVITY_WINDOW)? {
        out.insert(
            POST_INSTALL_EXCLUSIVITY_WINDOW.to_string(),
            Value::from(window),
        );
    }

    Ok(Value::Object(out))
}

fn optional_long(object: &Map<String, Value>, key: &str) -> Result<Option<i64>, JsonError> {
    match field(object, key) {
        None => Ok(None),
        Some(value) => coerce_long(value)
            .map(Some)
            .ok_or_else(|| JsonError::wrong_type(key, "an integer")),
    }
}

fn required_long(object: &Map<String, Value>, key: &str) -> Result<i64, JsonError> {
    optional_long(object, key)?.ok_or_else(|| JsonError::MissingField(key.to_string()))
}

/// Validates `x_network_key_mapping`.
///
/// Returns `Ok(None)` when any value is not a `0x`-prefixed string; the
/// mapping is dropped but the trigger stays valid.
///
/// # Errors
///
/// `RegistrationError::Parsing` when the mapping is not an object.
pub(crate) fn parse_x_network_key_mapping(value: &Value) -> Result<Option<Value>, RegistrationError> {
    let Value::Object(mapping) = value else {
        return Err(JsonError::wrong_type(X_NETWORK_KEY_MAPPING, "an object").into());
    };
    let all_hex = mapping
        .values()
        .all(|offset| offset.as_str().is_some_and(|s| s.starts_with("0x")));
    if !all_hex {
        log::debug!("Dropping x_network_key_mapping with a non-hex value");
        return Ok(None);
    }
    Ok(Some(value.clone()))
}
