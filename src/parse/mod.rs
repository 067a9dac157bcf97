//! Registration header parsing.
//!
//! This module turns the JSON payload of a registration header into a
//! validated [`Source`](crate::models::Source) or
//! [`Trigger`](crate::models::Trigger):
//! - [`json`] reads the header text leniently into a `serde_json::Value`
//! - [`parse_source`] and [`parse_trigger`] validate field by field
//! - aggregate key and cross-network (XNA) fields are checked in their own
//!   submodules
//!
//! Every parser returns `RegistrationError::Parsing` for malformed JSON or a
//! structural type mismatch, and `RegistrationError::Validation` for a
//! well-formed payload that breaks a rule.

mod aggregate;
mod debug;
pub mod json;
mod source;
mod trigger;
mod xna;

pub use aggregate::{is_valid_aggregate_key_id, is_valid_aggregate_key_piece};
pub use source::parse_source;
pub use trigger::parse_trigger;

use crate::config::MeasurementConfig;
use crate::error_handling::RegistrationError;
use crate::models::RegistrationDescriptor;
use crate::web::registration_origin;

/// Schema strictness for numeric and typed fields.
///
/// Legacy parsing coerces or drops malformed values where it historically
/// did; aligned-v1 rejects the whole registration instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsingMode {
    Legacy,
    AlignedV1,
}

impl ParsingMode {
    pub fn from_config(config: &MeasurementConfig) -> Self {
        if config.enable_ara_parsing_alignment_v1 {
            ParsingMode::AlignedV1
        } else {
            ParsingMode::Legacy
        }
    }

    pub fn is_aligned_v1(self) -> bool {
        self == ParsingMode::AlignedV1
    }
}

/// Registration origin of the fetched URI.
fn request_registration_origin(
    descriptor: &RegistrationDescriptor,
) -> Result<String, RegistrationError> {
    registration_origin(descriptor.registration_uri()).ok_or_else(|| {
        RegistrationError::validation(format!(
            "registration URI has no origin: {}",
            descriptor.registration_uri()
        ))
    })
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
