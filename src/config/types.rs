//! Configuration types.
//!
//! [`MeasurementConfig`] carries every limit and feature toggle the parsers and
//! fetchers read. It is passed explicitly into each call instead of being looked
//! up from global state, so the legacy / aligned-v1 parsing axis is an ordinary
//! input in tests.

use std::time::Duration;

use serde::Deserialize;

use crate::config::constants::*;
use crate::error_handling::ConfigError;

/// Logging level for the library's logger.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Options for the production HTTP client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout; expiry surfaces as a network error
    pub timeout: Duration,
    /// HTTP User-Agent header value
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Limits and feature toggles for registration parsing.
///
/// Allow and block lists are comma-joined strings as delivered by the flag
/// service; `*` matches every entry. See [`crate::AllowList`].
///
/// # Examples
///
/// ```
/// use registration_fetcher::MeasurementConfig;
///
/// let config = MeasurementConfig {
///     enable_ara_parsing_alignment_v1: true,
///     enable_xna: true,
///     ..Default::default()
/// };
/// assert_eq!(config.max_attribution_filters, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeasurementConfig {
    /// Strict numeric parsing: malformed values reject the registration
    /// instead of being dropped or coerced.
    pub enable_ara_parsing_alignment_v1: bool,

    /// Recognise `_lookback_window` in trigger filters
    pub enable_lookback_window_filter: bool,

    /// Lifts the filter size checks on trigger payloads
    pub enable_update_trigger_header_limit: bool,

    /// Skip enrollment resolution and attribute everything to a fixed id
    pub disable_enrollment_check: bool,

    // Filter limits
    pub max_filter_maps_per_filter_set: usize,
    pub max_attribution_filters: usize,
    pub max_bytes_per_attribution_filter_string: usize,
    pub max_values_per_attribution_filter: usize,

    // Aggregate limits
    pub max_aggregate_keys_per_source_registration: usize,
    pub max_aggregate_keys_per_trigger_registration: usize,
    pub max_bytes_per_aggregate_key_id: usize,
    pub max_aggregate_key_piece_length: usize,
    pub max_aggregate_deduplication_keys_per_registration: usize,
    pub max_sum_of_aggregate_values_per_source: i64,

    // Source windows, seconds
    pub min_source_expiry_secs: u64,
    pub max_source_expiry_secs: u64,
    pub min_event_report_window_secs: u64,
    pub min_install_attribution_window_secs: u64,
    pub max_install_attribution_window_secs: u64,
    pub min_post_install_exclusivity_window_secs: u64,
    pub max_post_install_exclusivity_window_secs: u64,

    pub max_distinct_web_destinations_in_source_registration: usize,

    // Flexible event reporting
    /// Accept `max_event_level_reports` and `event_report_windows`
    pub flex_lite_api_enabled: bool,
    /// Full flexible event reporting; also enables the flex-lite fields
    pub flexible_event_reporting_api_enabled: bool,
    pub flex_api_max_event_reports: i64,
    pub flex_api_max_event_report_windows: usize,

    /// Header payloads above this size are reported with the ad-tech origin
    pub max_response_based_registration_payload_size_bytes: u64,

    // Cross-network attribution
    pub enable_xna: bool,
    pub enable_shared_filter_data_keys_xna: bool,
    /// Apps allowed to register web triggers carrying XNA fields
    pub web_context_client_app_allowlist: String,

    // Debug gating
    pub enable_shared_source_debug_key: bool,
    pub debug_join_key_enrollment_allowlist: String,
    pub debug_ad_id_matching_enrollment_blocklist: String,

    pub enable_coarse_event_report_destinations: bool,

    // Aggregation coordinators
    pub aggregation_coordinator_origin_enabled: bool,
    pub aggregation_coordinator_origin_allowlist: String,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            enable_ara_parsing_alignment_v1: false,
            enable_lookback_window_filter: false,
            enable_update_trigger_header_limit: false,
            disable_enrollment_check: false,
            max_filter_maps_per_filter_set: MAX_FILTER_MAPS_PER_FILTER_SET,
            max_attribution_filters: MAX_ATTRIBUTION_FILTERS,
            max_bytes_per_attribution_filter_string: MAX_BYTES_PER_ATTRIBUTION_FILTER_STRING,
            max_values_per_attribution_filter: MAX_VALUES_PER_ATTRIBUTION_FILTER,
            max_aggregate_keys_per_source_registration: MAX_AGGREGATE_KEYS_PER_SOURCE_REGISTRATION,
            max_aggregate_keys_per_trigger_registration:
                MAX_AGGREGATE_KEYS_PER_TRIGGER_REGISTRATION,
            max_bytes_per_aggregate_key_id: MAX_BYTES_PER_AGGREGATE_KEY_ID,
            max_aggregate_key_piece_length: MAX_AGGREGATE_KEY_PIECE_LENGTH,
            max_aggregate_deduplication_keys_per_registration:
                MAX_AGGREGATE_DEDUPLICATION_KEYS_PER_REGISTRATION,
            max_sum_of_aggregate_values_per_source: MAX_SUM_OF_AGGREGATE_VALUES_PER_SOURCE,
            min_source_expiry_secs: MIN_SOURCE_EXPIRY_SECS,
            max_source_expiry_secs: MAX_SOURCE_EXPIRY_SECS,
            min_event_report_window_secs: MIN_EVENT_REPORT_WINDOW_SECS,
            min_install_attribution_window_secs: MIN_INSTALL_ATTRIBUTION_WINDOW_SECS,
            max_install_attribution_window_secs: MAX_INSTALL_ATTRIBUTION_WINDOW_SECS,
            min_post_install_exclusivity_window_secs: MIN_POST_INSTALL_EXCLUSIVITY_WINDOW_SECS,
            max_post_install_exclusivity_window_secs: MAX_POST_INSTALL_EXCLUSIVITY_WINDOW_SECS,
            max_distinct_web_destinations_in_source_registration:
                MAX_DISTINCT_WEB_DESTINATIONS_IN_SOURCE_REGISTRATION,
            flex_lite_api_enabled: false,
            flexible_event_reporting_api_enabled: false,
            flex_api_max_event_reports: FLEX_API_MAX_EVENT_REPORTS,
            flex_api_max_event_report_windows: FLEX_API_MAX_EVENT_REPORT_WINDOWS,
            max_response_based_registration_payload_size_bytes:
                MAX_RESPONSE_BASED_REGISTRATION_PAYLOAD_SIZE_BYTES,
            enable_xna: false,
            enable_shared_filter_data_keys_xna: false,
            web_context_client_app_allowlist: String::new(),
            enable_shared_source_debug_key: false,
            debug_join_key_enrollment_allowlist: String::new(),
            debug_ad_id_matching_enrollment_blocklist: String::new(),
            enable_coarse_event_report_destinations: false,
            aggregation_coordinator_origin_enabled: false,
            aggregation_coordinator_origin_allowlist: DEFAULT_AGGREGATION_COORDINATOR_ORIGINS
                .to_string(),
        }
    }
}

impl MeasurementConfig {
    /// Loads a configuration from a JSON document.
    ///
    /// Absent keys take their [`Default`] value, so a flag service only needs
    /// to ship the overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if the document is not valid JSON or a value
    /// has the wrong type, and `ConfigError::Invalid` if a bound pair is
    /// inverted (e.g. a minimum expiry above the maximum).
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MeasurementConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every `[min, max]` pair is ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pairs = [
            (
                "source expiry",
                self.min_source_expiry_secs,
                self.max_source_expiry_secs,
            ),
            (
                "install attribution window",
                self.min_install_attribution_window_secs,
                self.max_install_attribution_window_secs,
            ),
            (
                "post-install exclusivity window",
                self.min_post_install_exclusivity_window_secs,
                self.max_post_install_exclusivity_window_secs,
            ),
        ];
        for (name, min, max) in pairs {
            if min > max {
                return Err(ConfigError::Invalid(format!(
                    "{name}: minimum {min} exceeds maximum {max}"
                )));
            }
        }
        if self.max_sum_of_aggregate_values_per_source < 1 {
            return Err(ConfigError::Invalid(
                "max_sum_of_aggregate_values_per_source must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
