//! Attribution filter validation.
//!
//! A filter map is a JSON object from filter key to an array of string values.
//! A filter set is an array of filter maps. Sources declare `filter_data` as a
//! single map; triggers declare `filters` / `not_filters` as either form, and
//! a single map is wrapped into a one-element set before validation.
//!
//! Validation is all-or-nothing: one bad key, value or size anywhere makes the
//! whole set invalid.

use serde_json::{Map, Value};

use crate::config::common::LOOKBACK_WINDOW;
use crate::config::MeasurementConfig;
use crate::error_handling::{JsonError, RegistrationError};
use crate::parse::json::field;

/// Validates a filter value that may be a single map or a set of maps.
///
/// `None` (absent or `null`) and any non-container value are invalid.
///
/// # Arguments
///
/// * `filters` - The map or set to validate
/// * `config` - Size limits and the lookback-window flag
/// * `can_include_lookback_window` - Whether `_lookback_window` may appear
/// * `should_check_filter_size` - Whether count and length limits apply
pub fn are_valid_attribution_filters(
    filters: Option<&Value>,
    config: &MeasurementConfig,
    can_include_lookback_window: bool,
    should_check_filter_size: bool,
) -> bool {
    match filters {
        Some(Value::Array(set)) => are_valid_filter_set(
            set,
            config,
            can_include_lookback_window,
            should_check_filter_size,
        ),
        Some(Value::Object(map)) => are_valid_filter_map(
            map,
            config,
            can_include_lookback_window,
            should_check_filter_size,
        ),
        _ => false,
    }
}

/// Validates a filter set: every element must be a valid filter map.
pub fn are_valid_filter_set(
    filter_set: &[Value],
    config: &MeasurementConfig,
    can_include_lookback_window: bool,
    should_check_filter_size: bool,
) -> bool {
    if should_check_filter_size && filter_set.len() > config.max_filter_maps_per_filter_set {
        log::debug!(
            "Filter set has more maps than permitted: {}",
            filter_set.len()
        );
        return false;
    }
    filter_set.iter().all(|element| match element {
        Value::Object(map) => are_valid_filter_map(
            map,
            config,
            can_include_lookback_window,
            should_check_filter_size,
        ),
        _ => false,
    })
}

/// Validates one filter map.
pub fn are_valid_filter_map(
    filter_map: &Map<String, Value>,
    config: &MeasurementConfig,
    can_include_lookback_window: bool,
    should_check_filter_size: bool,
) -> bool {
    if should_check_filter_size && filter_map.len() > config.max_attribution_filters {
        log::debug!(
            "Filter map has more keys than permitted: {}",
            filter_map.len()
        );
        return false;
    }
    for (key, value) in filter_map {
        if should_check_filter_size && key.len() > config.max_bytes_per_attribution_filter_string
        {
            log::debug!("Filter key is too long: {key}");
            return false;
        }
        if config.enable_lookback_window_filter && key == LOOKBACK_WINDOW {
            if !can_include_lookback_window {
                log::debug!("Lookback window is not allowed in this filter");
                return false;
            }
            if !is_valid_lookback_window(value) {
                log::debug!("Lookback window must be a positive integer: {value}");
                return false;
            }
            continue;
        }
        let Value::Array(values) = value else {
            log::debug!("Filter values for {key} must be an array");
            return false;
        };
        if should_check_filter_size && values.len() > config.max_values_per_attribution_filter {
            log::debug!("Filter {key} has more values than permitted: {}", values.len());
            return false;
        }
        for filter_value in values {
            let Value::String(s) = filter_value else {
                log::debug!("Filter values for {key} must be strings");
                return false;
            };
            if should_check_filter_size && s.len() > config.max_bytes_per_attribution_filter_string
            {
                log::debug!("Filter value is too long: {s}");
                return false;
            }
        }
    }
    true
}

fn is_valid_lookback_window(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_i64().is_some_and(|seconds| seconds > 0),
        Value::String(s) => {
            !s.is_empty()
                && s.bytes().all(|b| b.is_ascii_digit())
                && s.parse::<i64>().is_ok_and(|seconds| seconds > 0)
        }
        _ => false,
    }
}

/// Normalizes the filters under `key` into a filter set.
///
/// A single object becomes a one-element array and an array is returned
/// unchanged.
///
/// # Errors
///
/// `JsonError::MissingField` when the key is absent or `null`, and
/// `JsonError::WrongType` for any other value type.
pub fn maybe_wrap_filters(object: &Map<String, Value>, key: &str) -> Result<Value, JsonError> {
    match field(object, key) {
        Some(Value::Object(map)) => Ok(Value::Array(vec![Value::Object(map.clone())])),
        Some(Value::Array(set)) => Ok(Value::Array(set.clone())),
        Some(_) => Err(JsonError::wrong_type(key, "an object or array")),
        None => Err(JsonError::MissingField(key.to_string())),
    }
}

/// Where a filter value sits, which decides the rules it is checked with.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    pub config: &'a MeasurementConfig,
    pub can_include_lookback_window: bool,
    pub should_check_filter_size: bool,
}

impl<'a> FilterContext<'a> {
    /// Source `filter_data`: size-checked, no lookback window.
    pub fn for_source(config: &'a MeasurementConfig) -> Self {
        Self {
            config,
            can_include_lookback_window: false,
            should_check_filter_size: true,
        }
    }

    /// Trigger filters: lookback window allowed; size checks are skipped once
    /// the trigger header limit update is on.
    pub fn for_trigger(config: &'a MeasurementConfig) -> Self {
        Self {
            config,
            can_include_lookback_window: true,
            should_check_filter_size: !config.enable_update_trigger_header_limit,
        }
    }

    pub fn is_valid_map(&self, filter_map: &Map<String, Value>) -> bool {
        are_valid_filter_map(
            filter_map,
            self.config,
            self.can_include_lookback_window,
            self.should_check_filter_size,
        )
    }
}

/// Wraps the filters under `key` and validates the resulting set.
///
/// # Errors
///
/// `RegistrationError::Parsing` when the value is neither an object nor an
/// array, `RegistrationError::Validation` when the set breaks a filter rule.
pub fn wrap_and_validate_filters(
    object: &Map<String, Value>,
    key: &str,
    context: &FilterContext<'_>,
) -> Result<Value, RegistrationError> {
    let wrapped = maybe_wrap_filters(object, key)?;
    let valid = are_valid_attribution_filters(
        Some(&wrapped),
        context.config,
        context.can_include_lookback_window,
        context.should_check_filter_size,
    );
    if !valid {
        return Err(RegistrationError::validation(format!("invalid `{key}`")));
    }
    Ok(wrapped)
}
