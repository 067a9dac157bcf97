//! Wire names: HTTP headers and JSON payload fields.
//!
//! Header names are matched case-insensitively when looked up in a response
//! (HTTP stacks are free to lowercase them), but are written here in their
//! canonical form.

// HTTP headers
/// Source registration payload
pub const HEADER_REGISTER_SOURCE: &str = "Attribution-Reporting-Register-Source";
/// Trigger registration payload
pub const HEADER_REGISTER_TRIGGER: &str = "Attribution-Reporting-Register-Trigger";
/// List-type redirects, zero or more values
pub const HEADER_REDIRECT: &str = "Attribution-Reporting-Redirect";
/// Location-type redirect
pub const HEADER_LOCATION: &str = "Location";
/// Request header announcing the source type on source fetches
pub const HEADER_SOURCE_INFO: &str = "Attribution-Reporting-Source-Info";

/// Field names shared by source and trigger payloads.
pub mod common {
    pub const FILTERS: &str = "filters";
    pub const NOT_FILTERS: &str = "not_filters";
    pub const PRIORITY: &str = "priority";
    pub const DEBUG_KEY: &str = "debug_key";
    pub const DEBUG_REPORTING: &str = "debug_reporting";
    pub const DEBUG_JOIN_KEY: &str = "debug_join_key";
    pub const DEBUG_AD_ID: &str = "debug_ad_id";
    pub const DEDUPLICATION_KEY: &str = "deduplication_key";
    /// Reserved filter key carrying a lookback window in seconds
    pub const LOOKBACK_WINDOW: &str = "_lookback_window";
}

/// `Attribution-Reporting-Register-Source` payload fields.
pub mod source {
    pub const SOURCE_EVENT_ID: &str = "source_event_id";
    pub const DESTINATION: &str = "destination";
    pub const WEB_DESTINATION: &str = "web_destination";
    pub const EXPIRY: &str = "expiry";
    pub const EVENT_REPORT_WINDOW: &str = "event_report_window";
    pub const AGGREGATABLE_REPORT_WINDOW: &str = "aggregatable_report_window";
    pub const INSTALL_ATTRIBUTION_WINDOW: &str = "install_attribution_window";
    pub const POST_INSTALL_EXCLUSIVITY_WINDOW: &str = "post_install_exclusivity_window";
    pub const FILTER_DATA: &str = "filter_data";
    pub const AGGREGATION_KEYS: &str = "aggregation_keys";
    pub const SHARED_AGGREGATION_KEYS: &str = "shared_aggregation_keys";
    pub const SHARED_FILTER_DATA_KEYS: &str = "shared_filter_data_keys";
    pub const SHARED_DEBUG_KEY: &str = "shared_debug_key";
    pub const COARSE_EVENT_REPORT_DESTINATIONS: &str = "coarse_event_report_destinations";
    pub const MAX_EVENT_LEVEL_REPORTS: &str = "max_event_level_reports";
    pub const EVENT_REPORT_WINDOWS: &str = "event_report_windows";
    pub const START_TIME: &str = "start_time";
    pub const END_TIMES: &str = "end_times";
    /// Filter data may not declare this key; it is derived from the request.
    pub const SOURCE_TYPE_FILTER_KEY: &str = "source_type";
}

/// `Attribution-Reporting-Register-Trigger` payload fields.
pub mod trigger {
    pub const EVENT_TRIGGER_DATA: &str = "event_trigger_data";
    pub const TRIGGER_DATA: &str = "trigger_data";
    pub const VALUE: &str = "value";
    pub const AGGREGATABLE_TRIGGER_DATA: &str = "aggregatable_trigger_data";
    pub const KEY_PIECE: &str = "key_piece";
    pub const SOURCE_KEYS: &str = "source_keys";
    pub const X_NETWORK_DATA: &str = "x_network_data";
    pub const KEY_OFFSET: &str = "key_offset";
    pub const AGGREGATABLE_VALUES: &str = "aggregatable_values";
    pub const AGGREGATABLE_DEDUPLICATION_KEYS: &str = "aggregatable_deduplication_keys";
    pub const ATTRIBUTION_CONFIG: &str = "attribution_config";
    pub const X_NETWORK_KEY_MAPPING: &str = "x_network_key_mapping";
    pub const AGGREGATION_COORDINATOR_ORIGIN: &str = "aggregation_coordinator_origin";
}

/// Fields of one `attribution_config` entry.
pub mod attribution_config {
    pub const SOURCE_NETWORK: &str = "source_network";
    pub const SOURCE_PRIORITY_RANGE: &str = "source_priority_range";
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const SOURCE_FILTERS: &str = "source_filters";
    pub const SOURCE_NOT_FILTERS: &str = "source_not_filters";
    pub const SOURCE_EXPIRY_OVERRIDE: &str = "source_expiry_override";
    pub const PRIORITY: &str = "priority";
    pub const EXPIRY: &str = "expiry";
    pub const FILTER_DATA: &str = "filter_data";
    pub const POST_INSTALL_EXCLUSIVITY_WINDOW: &str = "post_install_exclusivity_window";
}
