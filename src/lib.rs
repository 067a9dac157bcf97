//! registration_fetcher library: attribution registration fetch and validation
//!
//! This library fetches source and trigger registrations from ad-tech servers
//! over HTTPS, collects the redirects they announce, and validates the
//! registration JSON into [`Source`] and [`Trigger`] records.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use registration_fetcher::{
//!     ClientOptions, FetchStatus, LogRegistrationLogger, MeasurementConfig,
//!     RedirectAccumulator, RegistrationDescriptor, RegistrationType, ReqwestTransport,
//!     StaticEnrollmentResolver, TriggerFetcher,
//! };
//! use url::Url;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = ReqwestTransport::new(&ClientOptions::default())?;
//! let enrollment = StaticEnrollmentResolver::new()
//!     .with_enrollment("https://ad-tech.example", "enrollment-1");
//! let fetcher = TriggerFetcher::new(
//!     transport,
//!     MeasurementConfig::default(),
//!     Arc::new(enrollment),
//!     Arc::new(LogRegistrationLogger),
//! );
//!
//! let descriptor = RegistrationDescriptor::builder(
//!     RegistrationType::AppTrigger,
//!     Url::parse("https://ad-tech.example/register")?,
//!     Url::parse("android-app://com.advertiser")?,
//!     Url::parse("android-app://com.advertiser")?,
//! )
//! .build()?;
//!
//! let mut status = FetchStatus::new();
//! let mut redirects = RedirectAccumulator::new();
//! if let Some(trigger) = fetcher.fetch_trigger(&descriptor, &mut status, &mut redirects).await {
//!     println!("trigger from {}", trigger.registration_origin);
//! }
//! println!("{:?} {:?}", status.response_status, status.entity_status);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Fetching requires a Tokio runtime. Parsing is synchronous and can be used
//! on its own through [`parse_source`] and [`parse_trigger`].

pub mod config;
pub mod enrollment;
pub mod error_handling;
pub mod fetch;
pub mod filters;
pub mod initialization;
pub mod models;
pub mod numeric;
pub mod parse;
pub mod telemetry;
pub mod web;

// Re-export public API
pub use config::{ClientOptions, LogFormat, LogLevel, MeasurementConfig};
pub use enrollment::{AllowList, EnrollmentResolver, StaticEnrollmentResolver};
pub use error_handling::{EntityStatus, RegistrationError, ResponseStatus, TransportError};
pub use fetch::{
    FetchStatus, RedirectAccumulator, RedirectKind, RegistrationTransport, ReqwestTransport,
    ResponseHeaders, SourceFetcher, TransportResponse, TriggerFetcher,
};
pub use initialization::{init_client, init_logger_with};
pub use models::{
    EventSurfaceType, RegistrationDescriptor, RegistrationType, Source, SourceType, Trigger,
};
pub use numeric::UnsignedLong;
pub use parse::{parse_source, parse_trigger, ParsingMode};
pub use telemetry::{LogRegistrationLogger, RegistrationLogger, RegistrationResponseStats};
