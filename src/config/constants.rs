//! Configuration constants.
//!
//! Default limits and windows used by [`MeasurementConfig`](super::MeasurementConfig)
//! and by the payload parsers. All durations are in seconds unless the name
//! says otherwise.

use std::time::Duration;

const ONE_DAY_IN_SECONDS: u64 = 24 * 60 * 60;

// Network
/// Per-request timeout for registration fetches.
/// The surrounding queue enforces its own wall-clock budget on top of this.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// User-Agent sent with registration requests.
pub const DEFAULT_USER_AGENT: &str = concat!("registration_fetcher/", env!("CARGO_PKG_VERSION"));

// Source expiry and report windows
/// Shortest source lifetime (1 day).
pub const MIN_SOURCE_EXPIRY_SECS: u64 = ONE_DAY_IN_SECONDS;
/// Longest source lifetime (30 days). Also the default when `expiry` is absent.
pub const MAX_SOURCE_EXPIRY_SECS: u64 = 30 * ONE_DAY_IN_SECONDS;
/// Shortest event report window (1 hour).
pub const MIN_EVENT_REPORT_WINDOW_SECS: u64 = 60 * 60;
/// Install attribution window bounds; the default is the maximum.
pub const MIN_INSTALL_ATTRIBUTION_WINDOW_SECS: u64 = ONE_DAY_IN_SECONDS;
pub const MAX_INSTALL_ATTRIBUTION_WINDOW_SECS: u64 = 30 * ONE_DAY_IN_SECONDS;
/// Post-install exclusivity window bounds; the default is the minimum.
pub const MIN_POST_INSTALL_EXCLUSIVITY_WINDOW_SECS: u64 = 0;
pub const MAX_POST_INSTALL_EXCLUSIVITY_WINDOW_SECS: u64 = 30 * ONE_DAY_IN_SECONDS;
/// Event sources have their expiry rounded to this granularity.
pub const EXPIRY_ROUNDING_SECS: u64 = ONE_DAY_IN_SECONDS;

// Filters
/// Maximum number of keys in one filter map
pub const MAX_ATTRIBUTION_FILTERS: usize = 50;
/// Maximum byte length of a filter key or of a single filter value
pub const MAX_BYTES_PER_ATTRIBUTION_FILTER_STRING: usize = 25;
/// Maximum number of values under one filter key
pub const MAX_VALUES_PER_ATTRIBUTION_FILTER: usize = 50;
/// Maximum number of maps in a filter set
pub const MAX_FILTER_MAPS_PER_FILTER_SET: usize = 20;

// Aggregate keys
pub const MAX_AGGREGATE_KEYS_PER_SOURCE_REGISTRATION: usize = 50;
pub const MAX_AGGREGATE_KEYS_PER_TRIGGER_REGISTRATION: usize = 50;
pub const MAX_BYTES_PER_AGGREGATE_KEY_ID: usize = 25;
/// `0x` prefix plus up to 32 hex digits (128-bit key piece)
pub const MAX_AGGREGATE_KEY_PIECE_LENGTH: usize = 34;
pub const MAX_AGGREGATE_DEDUPLICATION_KEYS_PER_REGISTRATION: usize = 50;
/// Upper bound for a single aggregatable value in aligned-v1 parsing
pub const MAX_SUM_OF_AGGREGATE_VALUES_PER_SOURCE: i64 = 65536;

// Flexible event reporting
/// Largest `max_event_level_reports` a source may declare.
pub const FLEX_API_MAX_EVENT_REPORTS: i64 = 20;
/// Most end times `event_report_windows` may list.
pub const FLEX_API_MAX_EVENT_REPORT_WINDOWS: usize = 5;

// Destinations
pub const MAX_DISTINCT_WEB_DESTINATIONS_IN_SOURCE_REGISTRATION: usize = 3;

// Telemetry
/// Header payloads larger than this are reported with the ad-tech origin attached.
pub const MAX_RESPONSE_BASED_REGISTRATION_PAYLOAD_SIZE_BYTES: u64 = 16 * 1024;

/// Enrollment id used for every registration when the enrollment check is disabled.
pub const FAKE_ENROLLMENT: &str = "fake_enrollment";

/// Allow/block list entry that matches everything.
pub const ALLOW_ALL: &str = "*";

/// Aggregation coordinators accepted when the header names one.
pub const DEFAULT_AGGREGATION_COORDINATOR_ORIGINS: &str =
    "https://publickeyservice.msmt.aws.privacysandboxservices.com,https://publickeyservice.msmt.gcp.privacysandboxservices.com";
