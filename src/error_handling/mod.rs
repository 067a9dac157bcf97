//! Error handling and fetch status taxonomy.
//!
//! This module provides:
//! - [`ResponseStatus`] and [`EntityStatus`], the two terminal outcomes recorded
//!   per fetch
//! - `thiserror` enums for internal failures (transport, JSON, parsing,
//!   record building, configuration, initialization)
//! - Categorization of `reqwest` errors
//!
//! Fetch entry points never return these errors to the caller for malformed
//! input; they are folded into the status fields instead.

mod categorization;
mod types;

pub use categorization::categorize_reqwest_error;
pub use types::{
    ConfigError, EntityStatus, InitializationError, JsonError, RecordError, RegistrationError,
    ResponseStatus, TransportError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_status_names_are_unique() {
        let names: std::collections::HashSet<_> =
            ResponseStatus::iter().map(|s| s.as_str()).collect();
        assert_eq!(names.len(), ResponseStatus::iter().count());

        let names: std::collections::HashSet<_> =
            EntityStatus::iter().map(|s| s.as_str()).collect();
        assert_eq!(names.len(), EntityStatus::iter().count());
    }

    #[test]
    fn test_status_display_matches_as_str() {
        for status in EntityStatus::iter() {
            assert_eq!(status.to_string(), status.as_str());
        }
        for status in ResponseStatus::iter() {
            assert_eq!(status.to_string(), status.as_str());
        }
    }

    #[test]
    fn test_registration_error_maps_to_entity_status() {
        assert_eq!(
            RegistrationError::Parsing("x".into()).entity_status(),
            EntityStatus::ParsingError
        );
        assert_eq!(
            RegistrationError::Validation("x".into()).entity_status(),
            EntityStatus::ValidationError
        );
    }

    #[test]
    fn test_json_error_becomes_parsing_error() {
        let err: RegistrationError = JsonError::MissingField("source_network".into()).into();
        assert_eq!(err.entity_status(), EntityStatus::ParsingError);
        assert!(err.to_string().contains("source_network"));
    }

    #[test]
    fn test_record_error_becomes_validation_error() {
        let err: RegistrationError = RecordError::MissingField("enrollment_id").into();
        assert_eq!(err.entity_status(), EntityStatus::ValidationError);
    }
}
