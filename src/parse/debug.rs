//! Debug fields gated by enrollment and permissions.

use serde_json::{Map, Value};

use super::json::{coerce_bool, coerce_to_string, coerce_unsigned_long, field};
use crate::config::common::{DEBUG_AD_ID, DEBUG_JOIN_KEY, DEBUG_KEY, DEBUG_REPORTING};
use crate::config::MeasurementConfig;
use crate::enrollment::AllowList;
use crate::models::RegistrationDescriptor;
use crate::numeric::UnsignedLong;

/// `debug_reporting` is on only for `true` or `"true"`.
pub(crate) fn debug_reporting(json: &Map<String, Value>) -> bool {
    field(json, DEBUG_REPORTING).is_some_and(coerce_bool)
}

/// `debug_key`, dropped when it is not an unsigned 64-bit value.
pub(crate) fn debug_key(json: &Map<String, Value>) -> Option<UnsignedLong> {
    let value = field(json, DEBUG_KEY)?;
    let key = coerce_unsigned_long(value);
    if key.is_none() {
        log::debug!("Dropping invalid debug_key {value}");
    }
    key
}

/// `debug_join_key`, kept only for allowlisted enrollments.
pub(crate) fn debug_join_key(
    json: &Map<String, Value>,
    enrollment_id: &str,
    config: &MeasurementConfig,
) -> Option<String> {
    let value = field(json, DEBUG_JOIN_KEY)?;
    if !AllowList::parse(&config.debug_join_key_enrollment_allowlist).contains_exact(enrollment_id)
    {
        log::debug!("Dropping debug_join_key for enrollment {enrollment_id}");
        return None;
    }
    Some(coerce_to_string(value))
}

/// `debug_ad_id`, kept unless the enrollment is blocklisted (a `*` entry
/// blocks everyone) or the request lacked ad-id permission.
pub(crate) fn debug_ad_id(
    json: &Map<String, Value>,
    enrollment_id: &str,
    descriptor: &RegistrationDescriptor,
    config: &MeasurementConfig,
) -> Option<String> {
    let value = field(json, DEBUG_AD_ID)?;
    let blocklist = AllowList::parse(&config.debug_ad_id_matching_enrollment_blocklist);
    if blocklist.matches_all() || blocklist.contains_exact(enrollment_id) {
        log::debug!("Dropping debug_ad_id for blocklisted enrollment {enrollment_id}");
        return None;
    }
    if !descriptor.ad_id_permission() {
        log::debug!("Dropping debug_ad_id without ad-id permission");
        return None;
    }
    Some(coerce_to_string(value))
}
