//! `Attribution-Reporting-Register-Source` payload parsing.

use serde_json::{json, Map, Value};
use url::Url;

use super::aggregate::parse_aggregation_keys;
use super::debug::{debug_ad_id, debug_join_key, debug_key, debug_reporting};
use super::json::{
    coerce_long, coerce_to_string, coerce_unsigned_long, extract_long, extract_unsigned_long,
    field, parse_object,
};
use super::{request_registration_origin, ParsingMode};
use crate::config::common::PRIORITY;
use crate::config::source::{
    AGGREGATABLE_REPORT_WINDOW, AGGREGATION_KEYS, COARSE_EVENT_REPORT_DESTINATIONS, DESTINATION,
    END_TIMES, EVENT_REPORT_WINDOW, EVENT_REPORT_WINDOWS, EXPIRY, FILTER_DATA,
    INSTALL_ATTRIBUTION_WINDOW, MAX_EVENT_LEVEL_REPORTS, POST_INSTALL_EXCLUSIVITY_WINDOW,
    SHARED_AGGREGATION_KEYS, SHARED_DEBUG_KEY, SHARED_FILTER_DATA_KEYS, SOURCE_EVENT_ID,
    SOURCE_TYPE_FILTER_KEY, START_TIME, WEB_DESTINATION,
};
use crate::config::{MeasurementConfig, EXPIRY_ROUNDING_SECS};
use crate::error_handling::{JsonError, RegistrationError};
use crate::filters::FilterContext;
use crate::models::{EventSurfaceType, RegistrationDescriptor, Source, SourceBuilder, SourceType};
use crate::numeric::UnsignedLong;
use crate::web::{base_uri, top_private_domain_and_scheme, ANDROID_APP_SCHEME};

const MILLIS_PER_SECOND: i64 = 1000;

/// Parses and validates a source registration header.
///
/// # Arguments
///
/// * `descriptor` - The registration request the header answered
/// * `enrollment_id` - Enrollment resolved for the registration origin
/// * `header` - Raw `Attribution-Reporting-Register-Source` value
/// * `config` - Limits and feature flags
///
/// # Errors
///
/// `RegistrationError::Parsing` for malformed JSON, a structural type
/// mismatch, or a payload with neither `destination` nor `web_destination`.
/// `RegistrationError::Validation` for any other rule violation.
pub fn parse_source(
    descriptor: &RegistrationDescriptor,
    enrollment_id: &str,
    header: &str,
    config: &MeasurementConfig,
) -> Result<Source, RegistrationError> {
    let mode = ParsingMode::from_config(config);
    let json = parse_object(header)?;

    let source_type = descriptor
        .source_type()
        .ok_or_else(|| RegistrationError::validation("source registration without a source type"))?;

    if field(&json, DESTINATION).is_none() && field(&json, WEB_DESTINATION).is_none() {
        return Err(JsonError::MissingField(format!("{DESTINATION} or {WEB_DESTINATION}")).into());
    }

    let mut builder = SourceBuilder::new();
    builder.registration_id = descriptor.registration_id().to_string();
    builder.registration_origin = Some(request_registration_origin(descriptor)?);
    builder.enrollment_id = Some(enrollment_id.to_string());
    builder.publisher = Some(base_uri(descriptor.top_origin()).ok_or_else(|| {
        RegistrationError::validation(format!(
            "top origin has no base URI: {}",
            descriptor.top_origin()
        ))
    })?);
    builder.publisher_type = Some(EventSurfaceType::from(descriptor.registration_type()));
    builder.registrant = Some(descriptor.registrant().clone());
    builder.source_type = Some(source_type);
    builder.event_id = parse_source_event_id(&json, mode)?;

    let event_time = descriptor.request_time();
    builder.event_time = event_time;

    let windows = ReportWindows::parse(&json, source_type, mode, config)?;
    builder.expiry_time = event_time + windows.expiry * MILLIS_PER_SECOND;
    builder.event_report_window = windows
        .event_report_window
        .map(|window| event_time + window * MILLIS_PER_SECOND);
    builder.aggregatable_report_window =
        event_time + windows.aggregatable_report_window * MILLIS_PER_SECOND;
    builder.install_attribution_window = windows.install_attribution_window * MILLIS_PER_SECOND;
    builder.install_cooldown_window = windows.post_install_exclusivity_window * MILLIS_PER_SECOND;

    builder.priority = parse_priority(&json, mode)?;
    builder.is_debug_reporting = debug_reporting(&json);
    builder.debug_key = debug_key(&json);

    if let Some(filter_data) = field(&json, FILTER_DATA) {
        builder.filter_data = Some(parse_filter_data(filter_data, mode, config)?);
    }

    let app_destination = field(&json, DESTINATION)
        .map(parse_app_destination)
        .transpose()?;
    let web_destinations = field(&json, WEB_DESTINATION)
        .map(|value| parse_web_destinations(value, config))
        .transpose()?;

    if descriptor.is_web_request() {
        check_web_request_destinations(descriptor, app_destination.as_deref(), web_destinations.as_ref())?;
    }

    builder.app_destinations = app_destination.into_iter().collect();
    builder.web_destinations = web_destinations
        .map(|destinations| destinations.normalized)
        .unwrap_or_default();

    if let Some(aggregation_keys) = field(&json, AGGREGATION_KEYS) {
        builder.aggregate_source = Some(parse_aggregation_keys(aggregation_keys, config)?);
    }

    if config.enable_xna {
        builder.shared_aggregation_keys = optional_array(&json, SHARED_AGGREGATION_KEYS)?;
    }
    if config.enable_shared_filter_data_keys_xna {
        builder.shared_filter_data_keys = optional_array(&json, SHARED_FILTER_DATA_KEYS)?;
    }

    if config.enable_coarse_event_report_destinations {
        match field(&json, COARSE_EVENT_REPORT_DESTINATIONS) {
            None => {}
            Some(Value::Bool(coarse)) => builder.coarse_event_report_destinations = *coarse,
            Some(_) => {
                return Err(
                    JsonError::wrong_type(COARSE_EVENT_REPORT_DESTINATIONS, "a boolean").into(),
                )
            }
        }
    }

    if config.flex_lite_api_enabled || config.flexible_event_reporting_api_enabled {
        builder.max_event_level_reports = parse_max_event_level_reports(&json, config)?;
        builder.event_report_windows = parse_event_report_windows(&json, windows.expiry, config)?;
    }

    if config.enable_shared_source_debug_key {
        builder.shared_debug_key = field(&json, SHARED_DEBUG_KEY).and_then(coerce_unsigned_long);
    }

    builder.debug_join_key = debug_join_key(&json, enrollment_id, config);
    builder.debug_ad_id = debug_ad_id(&json, enrollment_id, descriptor, config);
    builder.platform_ad_id = descriptor.platform_ad_id().map(str::to_string);
    builder.ad_id_permission = descriptor.ad_id_permission();
    builder.ar_debug_permission = descriptor.debug_key_allowed();

    Ok(builder.build()?)
}

fn parse_source_event_id(
    json: &Map<String, Value>,
    mode: ParsingMode,
) -> Result<UnsignedLong, RegistrationError> {
    let Some(value) = field(json, SOURCE_EVENT_ID) else {
        return Ok(UnsignedLong::ZERO);
    };
    match mode {
        ParsingMode::Legacy => Ok(coerce_unsigned_long(value).unwrap_or_else(|| {
            log::debug!("Invalid source_event_id {value}, using 0");
            UnsignedLong::ZERO
        })),
        ParsingMode::AlignedV1 => extract_unsigned_long(value).ok_or_else(|| {
            RegistrationError::validation(format!("invalid source_event_id {value}"))
        }),
    }
}

fn parse_priority(json: &Map<String, Value>, mode: ParsingMode) -> Result<i64, RegistrationError> {
    let Some(value) = field(json, PRIORITY) else {
        return Ok(0);
    };
    let priority = match mode {
        ParsingMode::Legacy => coerce_long(value),
        ParsingMode::AlignedV1 => extract_long(value),
    };
    priority.ok_or_else(|| RegistrationError::validation(format!("invalid priority {value}")))
}

/// Source lifetimes and report windows in seconds, relative to event time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReportWindows {
    expiry: i64,
    event_report_window: Option<i64>,
    aggregatable_report_window: i64,
    install_attribution_window: i64,
    post_install_exclusivity_window: i64,
}

impl ReportWindows {
    fn parse(
        json: &Map<String, Value>,
        source_type: SourceType,
        mode: ParsingMode,
        config: &MeasurementConfig,
    ) -> Result<Self, RegistrationError> {
        let min_expiry = secs(config.min_source_expiry_secs);
        let max_expiry = secs(config.max_source_expiry_secs);

        let mut expiry = integral_seconds(json, EXPIRY, mode)?
            .map_or(max_expiry, |value| value.clamp(min_expiry, max_expiry));
        if source_type == SourceType::Event {
            expiry = round_to_whole_days(expiry).clamp(min_expiry, max_expiry);
        }

        let event_report_window = integral_seconds(json, EVENT_REPORT_WINDOW, mode)?.map(|value| {
            value
                .clamp(secs(config.min_event_report_window_secs), max_expiry)
                .min(expiry)
        });

        let aggregatable_report_window = integral_seconds(json, AGGREGATABLE_REPORT_WINDOW, mode)?
            .map_or(expiry, |value| value.clamp(min_expiry, max_expiry).min(expiry));

        let install_attribution_window = integral_seconds(json, INSTALL_ATTRIBUTION_WINDOW, mode)?
            .map_or(secs(config.max_install_attribution_window_secs), |value| {
                value.clamp(
                    secs(config.min_install_attribution_window_secs),
                    secs(config.max_install_attribution_window_secs),
                )
            });

        let post_install_exclusivity_window =
            integral_seconds(json, POST_INSTALL_EXCLUSIVITY_WINDOW, mode)?.map_or(
                secs(config.min_post_install_exclusivity_window_secs),
                |value| {
                    value.clamp(
                        secs(config.min_post_install_exclusivity_window_secs),
                        secs(config.max_post_install_exclusivity_window_secs),
                    )
                },
            );

        Ok(Self {
            expiry,
            event_report_window,
            aggregatable_report_window,
            install_attribution_window,
            post_install_exclusivity_window,
        })
    }
}

fn secs(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// A whole number of seconds from a JSON integer or integer string.
///
/// Aligned-v1 additionally requires the value to be unsigned.
fn integral_seconds(
    json: &Map<String, Value>,
    key: &str,
    mode: ParsingMode,
) -> Result<Option<i64>, RegistrationError> {
    let Some(value) = field(json, key) else {
        return Ok(None);
    };
    let seconds = match (mode, value) {
        (ParsingMode::Legacy, _) => coerce_long(value),
        (ParsingMode::AlignedV1, Value::Number(_) | Value::String(_)) => {
            UnsignedLong::parse(&coerce_to_string(value))
                .and_then(|seconds| i64::try_from(seconds.value()).ok())
        }
        (ParsingMode::AlignedV1, _) => None,
    };
    seconds.map(Some).ok_or_else(|| {
        RegistrationError::validation(format!("`{key}` must be a whole number of seconds"))
    })
}

/// Rounds to the nearest whole day, halves rounding up.
fn round_to_whole_days(seconds: i64) -> i64 {
    let day = secs(EXPIRY_ROUNDING_SECS);
    let remainder = seconds % day;
    if remainder >= day / 2 {
        seconds - remainder + day
    } else {
        seconds - remainder
    }
}

fn parse_max_event_level_reports(
    json: &Map<String, Value>,
    config: &MeasurementConfig,
) -> Result<Option<i64>, RegistrationError> {
    let Some(value) = field(json, MAX_EVENT_LEVEL_REPORTS) else {
        return Ok(None);
    };
    let reports = coerce_long(value)
        .ok_or_else(|| JsonError::wrong_type(MAX_EVENT_LEVEL_REPORTS, "an integer"))?;
    if reports > config.flex_api_max_event_reports {
        return Err(RegistrationError::validation(format!(
            "max_event_level_reports {reports} exceeds {}",
            config.flex_api_max_event_reports
        )));
    }
    Ok(Some(reports))
}

/// Validates `event_report_windows` against `expiry` (seconds) and returns it
/// with every time converted to milliseconds.
///
/// `start_time` defaults to 0. End times must be strictly increasing, the
/// first no earlier than the minimum event report window and the last no
/// later than expiry.
fn parse_event_report_windows(
    json: &Map<String, Value>,
    expiry: i64,
    config: &MeasurementConfig,
) -> Result<Option<String>, RegistrationError> {
    let Some(value) = field(json, EVENT_REPORT_WINDOWS) else {
        return Ok(None);
    };
    if field(json, EVENT_REPORT_WINDOW).is_some() {
        return Err(RegistrationError::validation(
            "only one of event_report_window and event_report_windows is allowed",
        ));
    }
    let windows = match value {
        Value::Object(windows) => windows.clone(),
        Value::String(text) => parse_object(text)?,
        _ => return Err(JsonError::wrong_type(EVENT_REPORT_WINDOWS, "an object").into()),
    };

    let start_time = match field(&windows, START_TIME) {
        None => 0,
        Some(value) => {
            coerce_long(value).ok_or_else(|| JsonError::wrong_type(START_TIME, "an integer"))?
        }
    };
    let end_times = match field(&windows, END_TIMES) {
        Some(Value::Array(values)) => values
            .iter()
            .map(|value| {
                coerce_long(value)
                    .ok_or_else(|| JsonError::wrong_type(END_TIMES, "an array of integers"))
            })
            .collect::<Result<Vec<i64>, JsonError>>()?,
        Some(_) => return Err(JsonError::wrong_type(END_TIMES, "an array").into()),
        None => return Err(JsonError::MissingField(END_TIMES.to_string()).into()),
    };

    let valid = match (end_times.first(), end_times.last()) {
        (Some(&first), Some(&last)) => {
            (0..=expiry).contains(&start_time)
                && end_times.len() <= config.flex_api_max_event_report_windows
                && start_time <= first
                && first >= secs(config.min_event_report_window_secs)
                && last <= expiry
                && end_times.windows(2).all(|pair| pair[0] < pair[1])
        }
        _ => false,
    };
    if !valid {
        return Err(RegistrationError::validation("invalid event_report_windows"));
    }

    let end_times: Vec<i64> = end_times
        .iter()
        .map(|end| end * MILLIS_PER_SECOND)
        .collect();
    Ok(Some(
        json!({
            START_TIME: start_time * MILLIS_PER_SECOND,
            END_TIMES: end_times,
        })
        .to_string(),
    ))
}

fn parse_filter_data(
    value: &Value,
    mode: ParsingMode,
    config: &MeasurementConfig,
) -> Result<String, RegistrationError> {
    let Value::Object(filter_map) = value else {
        return Err(RegistrationError::validation("filter_data must be an object"));
    };
    if !FilterContext::for_source(config).is_valid_map(filter_map) {
        return Err(RegistrationError::validation("invalid filter_data"));
    }
    if mode.is_aligned_v1() && filter_map.contains_key(SOURCE_TYPE_FILTER_KEY) {
        return Err(RegistrationError::validation(
            "filter_data must not declare source_type",
        ));
    }
    Ok(value.to_string())
}

/// Parses `destination` into an `android-app://` base URI.
///
/// A bare package name gets the app scheme prepended.
fn parse_app_destination(value: &Value) -> Result<String, RegistrationError> {
    let Value::String(raw) = value else {
        return Err(JsonError::wrong_type(DESTINATION, "a string").into());
    };
    let invalid = || RegistrationError::validation(format!("invalid destination `{raw}`"));
    let uri = match Url::parse(raw) {
        Ok(uri) => uri,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("{ANDROID_APP_SCHEME}://{raw}")).map_err(|_| invalid())?
        }
        Err(_) => return Err(invalid()),
    };
    if uri.scheme() != ANDROID_APP_SCHEME {
        return Err(invalid());
    }
    base_uri(&uri).ok_or_else(invalid)
}

#[derive(Debug)]
struct WebDestinations {
    /// As declared in the header
    raw: Vec<Url>,
    /// Scheme plus top private domain, deduplicated
    normalized: Vec<String>,
}

fn parse_web_destinations(
    value: &Value,
    config: &MeasurementConfig,
) -> Result<WebDestinations, RegistrationError> {
    let declared: Vec<&Value> = match value {
        Value::String(_) => vec![value],
        Value::Array(items) => items.iter().collect(),
        _ => return Err(JsonError::wrong_type(WEB_DESTINATION, "a string or array").into()),
    };
    if declared.is_empty()
        || declared.len() > config.max_distinct_web_destinations_in_source_registration
    {
        return Err(RegistrationError::validation(format!(
            "web_destination must have between 1 and {} entries",
            config.max_distinct_web_destinations_in_source_registration
        )));
    }

    let mut destinations = WebDestinations {
        raw: Vec::with_capacity(declared.len()),
        normalized: Vec::with_capacity(declared.len()),
    };
    for item in declared {
        let Value::String(raw) = item else {
            return Err(JsonError::wrong_type(WEB_DESTINATION, "an array of strings").into());
        };
        let invalid = || RegistrationError::validation(format!("invalid web_destination `{raw}`"));
        let uri = Url::parse(raw).map_err(|_| invalid())?;
        let site = top_private_domain_and_scheme(&uri).ok_or_else(invalid)?;
        if !destinations.normalized.contains(&site) {
            destinations.normalized.push(site);
        }
        destinations.raw.push(uri);
    }
    Ok(destinations)
}

/// Web sources must agree with the destinations the browser sent.
fn check_web_request_destinations(
    descriptor: &RegistrationDescriptor,
    app_destination: Option<&str>,
    web_destinations: Option<&WebDestinations>,
) -> Result<(), RegistrationError> {
    if let Some(os_destination) = descriptor.os_destination() {
        if app_destination != base_uri(os_destination).as_deref() {
            return Err(RegistrationError::validation(format!(
                "destination does not match requested os destination {os_destination}"
            )));
        }
    }
    if let Some(web_destination) = descriptor.web_destination() {
        let matches = web_destinations
            .is_some_and(|destinations| destinations.raw.iter().any(|uri| uri == web_destination));
        if !matches {
            return Err(RegistrationError::validation(format!(
                "web_destination does not match requested web destination {web_destination}"
            )));
        }
    }
    Ok(())
}

fn optional_array(json: &Map<String, Value>, key: &str) -> Result<Option<String>, RegistrationError> {
    match field(json, key) {
        None => Ok(None),
        Some(value @ Value::Array(_)) => Ok(Some(value.to_string())),
        Some(_) => Err(JsonError::wrong_type(key, "an array").into()),
    }
}
