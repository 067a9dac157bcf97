//! Error type definitions.
//!
//! This module defines the per-fetch status taxonomy and the internal error
//! enums used throughout the crate.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error loading a [`MeasurementConfig`](crate::MeasurementConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Failure of the HTTP round trip itself.
///
/// Every variant maps to [`ResponseStatus::NetworkError`]; the split exists for
/// logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// Syntax or shape error while reading a registration header as JSON.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JsonError {
    /// The text is not a JSON value.
    #[error("malformed JSON at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// A field is present with a type the schema does not allow.
    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    /// A required field is absent.
    #[error("missing required field `{0}`")]
    MissingField(String),
}

impl JsonError {
    pub(crate) fn wrong_type(field: &str, expected: &'static str) -> Self {
        JsonError::WrongType {
            field: field.to_string(),
            expected,
        }
    }
}

/// Outcome of a rejected registration payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// Malformed JSON or a structural type mismatch.
    #[error("parsing error: {0}")]
    Parsing(String),

    /// Well-formed JSON that fails a schema or policy rule.
    #[error("validation error: {0}")]
    Validation(String),
}

impl RegistrationError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        RegistrationError::Validation(message.into())
    }

    /// The entity status this outcome is reported as.
    pub fn entity_status(&self) -> EntityStatus {
        match self {
            RegistrationError::Parsing(_) => EntityStatus::ParsingError,
            RegistrationError::Validation(_) => EntityStatus::ValidationError,
        }
    }
}

impl From<JsonError> for RegistrationError {
    fn from(err: JsonError) -> Self {
        RegistrationError::Parsing(err.to_string())
    }
}

/// A record builder was finalized without a required field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

impl From<RecordError> for RegistrationError {
    fn from(err: RecordError) -> Self {
        RegistrationError::Validation(err.to_string())
    }
}

/// Outcome of the HTTP exchange for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ResponseStatus {
    Success,
    /// I/O failure or timeout; the caller may retry the descriptor later
    NetworkError,
    /// Registration URI is not `https` or has no host; nothing was sent
    InvalidUrl,
    /// The server answered with a status outside 2xx/3xx
    ServerUnavailable,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Success => "SUCCESS",
            ResponseStatus::NetworkError => "NETWORK_ERROR",
            ResponseStatus::InvalidUrl => "INVALID_URL",
            ResponseStatus::ServerUnavailable => "SERVER_UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of interpreting the registration payload for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum EntityStatus {
    Success,
    HeaderMissing,
    InvalidEnrollment,
    ParsingError,
    ValidationError,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Success => "SUCCESS",
            EntityStatus::HeaderMissing => "HEADER_MISSING",
            EntityStatus::InvalidEnrollment => "INVALID_ENROLLMENT",
            EntityStatus::ParsingError => "PARSING_ERROR",
            EntityStatus::ValidationError => "VALIDATION_ERROR",
        }
    }
}

impl std::fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
