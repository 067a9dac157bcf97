//! Aggregate key fields shared by source and trigger payloads.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::json::{coerce_to_string, coerce_unsigned_long, extract_unsigned_long, field};
use super::ParsingMode;
use crate::config::common::{DEDUPLICATION_KEY, FILTERS, NOT_FILTERS};
use crate::config::source::AGGREGATION_KEYS;
use crate::config::trigger::{
    AGGREGATABLE_DEDUPLICATION_KEYS, AGGREGATABLE_TRIGGER_DATA, AGGREGATABLE_VALUES, KEY_OFFSET,
    KEY_PIECE, SOURCE_KEYS, X_NETWORK_DATA,
};
use crate::config::MeasurementConfig;
use crate::error_handling::{JsonError, RegistrationError};
use crate::filters::{wrap_and_validate_filters, FilterContext};
use crate::numeric::is_64_bit_integer;

/// A key piece is a `0x`-prefixed hex string of bounded length.
pub fn is_valid_aggregate_key_piece(key_piece: &str, config: &MeasurementConfig) -> bool {
    let has_prefix = key_piece.starts_with("0x") || key_piece.starts_with("0X");
    has_prefix && key_piece.len() > 2 && key_piece.len() <= config.max_aggregate_key_piece_length
}

/// A key id is a non-empty string of bounded byte length.
pub fn is_valid_aggregate_key_id(key_id: &str, config: &MeasurementConfig) -> bool {
    !key_id.is_empty() && key_id.len() <= config.max_bytes_per_aggregate_key_id
}

/// Validates a source's `aggregation_keys` object and returns it serialized.
pub(crate) fn parse_aggregation_keys(
    value: &Value,
    config: &MeasurementConfig,
) -> Result<String, RegistrationError> {
    let Value::Object(keys) = value else {
        return Err(JsonError::wrong_type(AGGREGATION_KEYS, "an object").into());
    };
    if keys.len() > config.max_aggregate_keys_per_source_registration {
        return Err(RegistrationError::validation(format!(
            "too many aggregation keys: {}",
            keys.len()
        )));
    }
    for (id, key_piece) in keys {
        if !is_valid_aggregate_key_id(id, config) {
            return Err(RegistrationError::validation(format!(
                "invalid aggregation key id `{id}`"
            )));
        }
        let valid_piece = key_piece
            .as_str()
            .is_some_and(|piece| is_valid_aggregate_key_piece(piece, config));
        if !valid_piece {
            return Err(RegistrationError::validation(format!(
                "invalid key piece for aggregation key `{id}`"
            )));
        }
    }
    Ok(value.to_string())
}

/// Validates `aggregatable_trigger_data` and returns the normalized array.
///
/// Entries keep their original fields; `filters` and `not_filters` are
/// replaced by their wrapped form and a missing `source_keys` becomes `[]` in
/// legacy mode.
pub(crate) fn parse_aggregate_trigger_data(
    entries: &[Value],
    mode: ParsingMode,
    filter_context: &FilterContext<'_>,
) -> Result<Value, RegistrationError> {
    let config = filter_context.config;
    let mut distinct_source_keys: HashSet<String> = HashSet::new();
    let mut normalized = Vec::with_capacity(entries.len());

    for entry in entries {
        let Value::Object(entry) = entry else {
            return Err(
                JsonError::wrong_type(AGGREGATABLE_TRIGGER_DATA, "an array of objects")
                    .into(),
            );
        };
        let mut out = entry.clone();

        let key_piece = field(entry, KEY_PIECE).map(coerce_to_string).unwrap_or_default();
        if !is_valid_aggregate_key_piece(&key_piece, config) {
            return Err(RegistrationError::validation(format!(
                "invalid key_piece `{key_piece}`"
            )));
        }

        match field(entry, SOURCE_KEYS) {
            Some(Value::Array(source_keys)) => {
                if source_keys.len() > config.max_aggregate_keys_per_trigger_registration {
                    return Err(RegistrationError::validation("too many source_keys"));
                }
                for source_key in source_keys {
                    let key = source_key_id(source_key, mode)?;
                    if !is_valid_aggregate_key_id(&key, config) {
                        return Err(RegistrationError::validation(format!(
                            "invalid source key `{key}`"
                        )));
                    }
                    distinct_source_keys.insert(key);
                }
            }
            Some(_) => return Err(JsonError::wrong_type(SOURCE_KEYS, "an array").into()),
            None if mode.is_aligned_v1() => {
                return Err(RegistrationError::validation(
                    "aggregatable trigger data entry is missing source_keys",
                ));
            }
            None => {
                out.insert(SOURCE_KEYS.to_string(), Value::Array(Vec::new()));
            }
        }

        wrap_filter_pair(entry, &mut out, filter_context)?;

        if let Some(x_network_data) = field(entry, X_NETWORK_DATA) {
            let Value::Object(x_network_data) = x_network_data else {
                return Err(JsonError::wrong_type(X_NETWORK_DATA, "an object").into());
            };
            if let Some(key_offset) = field(x_network_data, KEY_OFFSET) {
                if coerce_unsigned_long(key_offset).is_none() {
                    return Err(RegistrationError::validation(format!(
                        "invalid key_offset {key_offset}"
                    )));
                }
            }
        }

        normalized.push(Value::Object(out));
    }

    if distinct_source_keys.len() > config.max_aggregate_keys_per_trigger_registration {
        return Err(RegistrationError::validation(format!(
            "too many distinct source keys: {}",
            distinct_source_keys.len()
        )));
    }
    Ok(Value::Array(normalized))
}

fn source_key_id(source_key: &Value, mode: ParsingMode) -> Result<String, RegistrationError> {
    match source_key {
        Value::String(key) => Ok(key.clone()),
        Value::Array(_) | Value::Object(_) | Value::Null => {
            Err(JsonError::wrong_type(SOURCE_KEYS, "an array of strings").into())
        }
        other if mode.is_aligned_v1() => Err(RegistrationError::validation(format!(
            "source key {other} is not a string"
        ))),
        other => Ok(coerce_to_string(other)),
    }
}

/// Validates `aggregatable_values` and returns it serialized.
///
/// Legacy parsing accepts any value; aligned-v1 requires an integer in
/// `[1, max_sum_of_aggregate_values_per_source]`.
pub(crate) fn parse_aggregatable_values(
    value: &Value,
    mode: ParsingMode,
    config: &MeasurementConfig,
) -> Result<String, RegistrationError> {
    let Value::Object(values) = value else {
        return Err(JsonError::wrong_type(AGGREGATABLE_VALUES, "an object").into());
    };
    if values.len() > config.max_aggregate_keys_per_trigger_registration {
        return Err(RegistrationError::validation(format!(
            "too many aggregatable values: {}",
            values.len()
        )));
    }
    for (id, aggregate_value) in values {
        if !is_valid_aggregate_key_id(id, config) {
            return Err(RegistrationError::validation(format!(
                "invalid aggregatable value key `{id}`"
            )));
        }
        if mode.is_aligned_v1() && !is_valid_aggregatable_value(aggregate_value, config) {
            return Err(RegistrationError::validation(format!(
                "aggregatable value for `{id}` out of range: {aggregate_value}"
            )));
        }
    }
    Ok(value.to_string())
}

fn is_valid_aggregatable_value(value: &Value, config: &MeasurementConfig) -> bool {
    if !is_64_bit_integer(value) {
        return false;
    }
    value
        .as_i64()
        .is_some_and(|v| (1..=config.max_sum_of_aggregate_values_per_source).contains(&v))
}

/// Validates `aggregatable_deduplication_keys` and returns the normalized
/// array of `{deduplication_key?, filters?, not_filters?}` objects.
pub(crate) fn parse_aggregate_deduplication_keys(
    entries: &[Value],
    mode: ParsingMode,
    filter_context: &FilterContext<'_>,
) -> Result<Value, RegistrationError> {
    let config = filter_context.config;
    if entries.len() > config.max_aggregate_deduplication_keys_per_registration {
        return Err(RegistrationError::validation(format!(
            "too many aggregatable deduplication keys: {}",
            entries.len()
        )));
    }
    let mut normalized = Vec::with_capacity(entries.len());
    for entry in entries {
        let Value::Object(entry) = entry else {
            return Err(JsonError::wrong_type(
                AGGREGATABLE_DEDUPLICATION_KEYS,
                "an array of objects",
            )
            .into());
        };
        let mut out = Map::new();
        if let Some(raw_key) = field(entry, DEDUPLICATION_KEY) {
            let key = match mode {
                ParsingMode::AlignedV1 => extract_unsigned_long(raw_key),
                ParsingMode::Legacy => coerce_unsigned_long(raw_key),
            };
            match key {
                Some(key) => {
                    out.insert(DEDUPLICATION_KEY.to_string(), Value::String(key.to_string()));
                }
                None if mode.is_aligned_v1() => {
                    return Err(RegistrationError::validation(format!(
                        "invalid aggregatable deduplication key {raw_key}"
                    )));
                }
                None => log::debug!("Dropping invalid aggregatable deduplication key {raw_key}"),
            }
        }
        wrap_filter_pair(entry, &mut out, filter_context)?;
        normalized.push(Value::Object(out));
    }
    Ok(Value::Array(normalized))
}

/// Copies the wrapped and validated `filters` / `not_filters` of `entry` into
/// `out`, overwriting any raw form already there.
pub(crate) fn wrap_filter_pair(
    entry: &Map<String, Value>,
    out: &mut Map<String, Value>,
    filter_context: &FilterContext<'_>,
) -> Result<(), RegistrationError> {
    for key in [FILTERS, NOT_FILTERS] {
        if field(entry, key).is_some() {
            let wrapped = wrap_and_validate_filters(entry, key, filter_context)?;
            out.insert(key.to_string(), wrapped);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> MeasurementConfig {
        MeasurementConfig::default()
    }

    fn filter_context(config: &MeasurementConfig) -> FilterContext<'_> {
        FilterContext::for_trigger(config)
    }

    fn array(value: Value) -> Vec<Value> {
        match value {
            Value::Array(items) => items,
            other => panic!("expected an array, got {other}"),
        }
    }

    #[test]
    fn test_key_piece_bounds() {
        let config = config();
        assert!(is_valid_aggregate_key_piece("0x1", &config));
        assert!(is_valid_aggregate_key_piece("0XAB", &config));
        assert!(!is_valid_aggregate_key_piece("0x", &config));
        assert!(!is_valid_aggregate_key_piece("1x400", &config));
        assert!(!is_valid_aggregate_key_piece("", &config));

        let longest = format!("0x{}", "f".repeat(32));
        assert!(is_valid_aggregate_key_piece(&longest, &config));
        let too_long = format!("0x{}", "f".repeat(33));
        assert!(!is_valid_aggregate_key_piece(&too_long, &config));
    }

    #[test]
    fn test_key_id_bounds() {
        let config = config();
        assert!(is_valid_aggregate_key_id("campaignCounts", &config));
        assert!(!is_valid_aggregate_key_id("", &config));
        assert!(!is_valid_aggregate_key_id(&"k".repeat(26), &config));
    }

    #[test]
    fn test_aggregation_keys() {
        let config = config();
        assert!(parse_aggregation_keys(&json!({"campaignCounts": "0x159"}), &config).is_ok());
        assert!(matches!(
            parse_aggregation_keys(&json!({"campaignCounts": "159"}), &config),
            Err(RegistrationError::Validation(_))
        ));
        assert!(matches!(
            parse_aggregation_keys(&json!({"campaignCounts": 159}), &config),
            Err(RegistrationError::Validation(_))
        ));
        assert!(matches!(
            parse_aggregation_keys(&json!(["0x159"]), &config),
            Err(RegistrationError::Parsing(_))
        ));

        let mut keys = Map::new();
        for i in 0..=config.max_aggregate_keys_per_source_registration {
            keys.insert(format!("key{i}"), json!("0x1"));
        }
        assert!(parse_aggregation_keys(&Value::Object(keys), &config).is_err());
    }

    #[test]
    fn test_trigger_data_missing_source_keys_by_mode() {
        let config = config();
        let entries = array(json!([{"key_piece": "0x400"}]));

        let legacy =
            parse_aggregate_trigger_data(&entries, ParsingMode::Legacy, &filter_context(&config))
                .unwrap();
        assert_eq!(legacy, json!([{"key_piece": "0x400", "source_keys": []}]));

        assert!(matches!(
            parse_aggregate_trigger_data(&entries, ParsingMode::AlignedV1, &filter_context(&config)),
            Err(RegistrationError::Validation(_))
        ));
    }

    #[test]
    fn test_trigger_data_wraps_filters() {
        let config = config();
        let entries = array(json!([{
            "key_piece": "0x400",
            "source_keys": ["campaignCounts"],
            "filters": {"conversion_subdomain": ["electronics.megastore"]},
            "not_filters": [{"product": ["1"]}]
        }]));
        let parsed =
            parse_aggregate_trigger_data(&entries, ParsingMode::AlignedV1, &filter_context(&config))
                .unwrap();
        assert_eq!(
            parsed,
            json!([{
                "key_piece": "0x400",
                "source_keys": ["campaignCounts"],
                "filters": [{"conversion_subdomain": ["electronics.megastore"]}],
                "not_filters": [{"product": ["1"]}]
            }])
        );
    }

    #[test]
    fn test_trigger_data_distinct_source_key_cap() {
        let config = MeasurementConfig {
            max_aggregate_keys_per_trigger_registration: 2,
            ..MeasurementConfig::default()
        };
        let entries = array(json!([
            {"key_piece": "0x1", "source_keys": ["a", "b"]},
            {"key_piece": "0x2", "source_keys": ["b", "c"]}
        ]));
        assert!(parse_aggregate_trigger_data(
            &entries,
            ParsingMode::Legacy,
            &filter_context(&config)
        )
        .is_err());

        let shared = array(json!([
            {"key_piece": "0x1", "source_keys": ["a", "b"]},
            {"key_piece": "0x2", "source_keys": ["b", "a"]}
        ]));
        assert!(parse_aggregate_trigger_data(
            &shared,
            ParsingMode::Legacy,
            &filter_context(&config)
        )
        .is_ok());
    }

    #[test]
    fn test_trigger_data_non_string_source_key() {
        let config = config();
        let entries = array(json!([{"key_piece": "0x1", "source_keys": [12]}]));
        let legacy =
            parse_aggregate_trigger_data(&entries, ParsingMode::Legacy, &filter_context(&config))
                .unwrap();
        assert_eq!(legacy[0]["source_keys"], json!([12]));
        assert!(parse_aggregate_trigger_data(
            &entries,
            ParsingMode::AlignedV1,
            &filter_context(&config)
        )
        .is_err());
    }

    #[test]
    fn test_trigger_data_key_offset() {
        let config = config();
        let valid = array(json!([{
            "key_piece": "0x1",
            "source_keys": ["a"],
            "x_network_data": {"key_offset": 12}
        }]));
        assert!(
            parse_aggregate_trigger_data(&valid, ParsingMode::Legacy, &filter_context(&config))
                .is_ok()
        );

        let invalid = array(json!([{
            "key_piece": "0x1",
            "source_keys": ["a"],
            "x_network_data": {"key_offset": "-1"}
        }]));
        assert!(matches!(
            parse_aggregate_trigger_data(&invalid, ParsingMode::Legacy, &filter_context(&config)),
            Err(RegistrationError::Validation(_))
        ));
    }

    #[test]
    fn test_aggregatable_values_by_mode() {
        let config = config();
        for value in [json!(0), json!(-3), json!(1.5), json!("12"), json!(65537)] {
            let values = json!({ "campaignCounts": value });
            assert!(parse_aggregatable_values(&values, ParsingMode::Legacy, &config).is_ok());
            assert!(
                parse_aggregatable_values(&values, ParsingMode::AlignedV1, &config).is_err(),
                "{values} should be rejected in aligned-v1"
            );
        }
        let values = json!({"campaignCounts": 32768, "geoValue": 1664});
        assert_eq!(
            parse_aggregatable_values(&values, ParsingMode::AlignedV1, &config).unwrap(),
            values.to_string()
        );
    }

    #[test]
    fn test_deduplication_keys_by_mode() {
        let config = config();
        let entries = array(json!([
            {"deduplication_key": "10", "filters": {"a": ["b"]}},
            {"filters": {"c": ["d"]}},
            {"deduplication_key": "-1"}
        ]));
        let legacy = parse_aggregate_deduplication_keys(
            &entries,
            ParsingMode::Legacy,
            &filter_context(&config),
        )
        .unwrap();
        assert_eq!(
            legacy,
            json!([
                {"deduplication_key": "10", "filters": [{"a": ["b"]}]},
                {"filters": [{"c": ["d"]}]},
                {}
            ])
        );
        assert!(parse_aggregate_deduplication_keys(
            &entries,
            ParsingMode::AlignedV1,
            &filter_context(&config)
        )
        .is_err());
    }

    #[test]
    fn test_too_many_deduplication_keys() {
        let config = config();
        let entries: Vec<Value> = (0..=config.max_aggregate_deduplication_keys_per_registration)
            .map(|i| json!({"deduplication_key": i.to_string()}))
            .collect();
        assert!(matches!(
            parse_aggregate_deduplication_keys(
                &entries,
                ParsingMode::Legacy,
                &filter_context(&config)
            ),
            Err(RegistrationError::Validation(_))
        ));
    }
}
