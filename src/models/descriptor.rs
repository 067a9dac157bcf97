//! The registration request a fetch works from.

use url::Url;

use crate::error_handling::RecordError;

/// What the registration registers, and from which context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationType {
    AppSource,
    AppTrigger,
    WebSource,
    WebTrigger,
}

impl RegistrationType {
    pub fn is_source(&self) -> bool {
        matches!(self, RegistrationType::AppSource | RegistrationType::WebSource)
    }

    pub fn is_web(&self) -> bool {
        matches!(self, RegistrationType::WebSource | RegistrationType::WebTrigger)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationType::AppSource => "APP_SOURCE",
            RegistrationType::AppTrigger => "APP_TRIGGER",
            RegistrationType::WebSource => "WEB_SOURCE",
            RegistrationType::WebTrigger => "WEB_TRIGGER",
        }
    }
}

/// Kind of ad interaction a source was registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    /// A view
    Event,
    /// A click
    Navigation,
}

impl SourceType {
    /// Value sent in the `Attribution-Reporting-Source-Info` request header.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Event => "event",
            SourceType::Navigation => "navigation",
        }
    }
}

/// Whether a publisher or destination is an app or a website.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSurfaceType {
    App,
    Web,
}

impl From<RegistrationType> for EventSurfaceType {
    fn from(registration_type: RegistrationType) -> Self {
        if registration_type.is_web() {
            EventSurfaceType::Web
        } else {
            EventSurfaceType::App
        }
    }
}

/// A pending registration, as created by the enqueue layer.
///
/// Read-only once built; construct with [`RegistrationDescriptor::builder`].
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationDescriptor {
    id: String,
    registration_uri: Url,
    top_origin: Url,
    registrant: Url,
    web_destination: Option<Url>,
    os_destination: Option<Url>,
    verified_destination: Option<Url>,
    registration_type: RegistrationType,
    source_type: Option<SourceType>,
    request_time: i64,
    retry_count: u32,
    debug_key_allowed: bool,
    ad_id_permission: bool,
    platform_ad_id: Option<String>,
    registration_id: String,
}

impl RegistrationDescriptor {
    /// Starts a descriptor with the fields every registration carries.
    pub fn builder(
        registration_type: RegistrationType,
        registration_uri: Url,
        top_origin: Url,
        registrant: Url,
    ) -> RegistrationDescriptorBuilder {
        RegistrationDescriptorBuilder {
            id: String::new(),
            registration_uri,
            top_origin,
            registrant,
            web_destination: None,
            os_destination: None,
            verified_destination: None,
            registration_type,
            source_type: None,
            request_time: 0,
            retry_count: 0,
            debug_key_allowed: false,
            ad_id_permission: false,
            platform_ad_id: None,
            registration_id: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn registration_uri(&self) -> &Url {
        &self.registration_uri
    }

    pub fn top_origin(&self) -> &Url {
        &self.top_origin
    }

    pub fn registrant(&self) -> &Url {
        &self.registrant
    }

    pub fn web_destination(&self) -> Option<&Url> {
        self.web_destination.as_ref()
    }

    pub fn os_destination(&self) -> Option<&Url> {
        self.os_destination.as_ref()
    }

    pub fn verified_destination(&self) -> Option<&Url> {
        self.verified_destination.as_ref()
    }

    pub fn registration_type(&self) -> RegistrationType {
        self.registration_type
    }

    /// Present for source registrations only.
    pub fn source_type(&self) -> Option<SourceType> {
        self.source_type
    }

    /// Milliseconds since the Unix epoch.
    pub fn request_time(&self) -> i64 {
        self.request_time
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn debug_key_allowed(&self) -> bool {
        self.debug_key_allowed
    }

    pub fn ad_id_permission(&self) -> bool {
        self.ad_id_permission
    }

    pub fn platform_ad_id(&self) -> Option<&str> {
        self.platform_ad_id.as_deref()
    }

    pub fn registration_id(&self) -> &str {
        &self.registration_id
    }

    pub fn is_web_request(&self) -> bool {
        self.registration_type.is_web()
    }
}

/// Builder for [`RegistrationDescriptor`].
#[derive(Debug, Clone)]
pub struct RegistrationDescriptorBuilder {
    id: String,
    registration_uri: Url,
    top_origin: Url,
    registrant: Url,
    web_destination: Option<Url>,
    os_destination: Option<Url>,
    verified_destination: Option<Url>,
    registration_type: RegistrationType,
    source_type: Option<SourceType>,
    request_time: i64,
    retry_count: u32,
    debug_key_allowed: bool,
    ad_id_permission: bool,
    platform_ad_id: Option<String>,
    registration_id: String,
}

impl RegistrationDescriptorBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn web_destination(mut self, destination: Url) -> Self {
        self.web_destination = Some(destination);
        self
    }

    pub fn os_destination(mut self, destination: Url) -> Self {
        self.os_destination = Some(destination);
        self
    }

    pub fn verified_destination(mut self, destination: Url) -> Self {
        self.verified_destination = Some(destination);
        self
    }

    pub fn source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = Some(source_type);
        self
    }

    pub fn request_time(mut self, epoch_millis: i64) -> Self {
        self.request_time = epoch_millis;
        self
    }

    pub fn retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn debug_key_allowed(mut self, allowed: bool) -> Self {
        self.debug_key_allowed = allowed;
        self
    }

    pub fn ad_id_permission(mut self, permission: bool) -> Self {
        self.ad_id_permission = permission;
        self
    }

    pub fn platform_ad_id(mut self, ad_id: impl Into<String>) -> Self {
        self.platform_ad_id = Some(ad_id.into());
        self
    }

    pub fn registration_id(mut self, registration_id: impl Into<String>) -> Self {
        self.registration_id = registration_id.into();
        self
    }

    /// Finishes the descriptor.
    ///
    /// # Errors
    ///
    /// Source registrations require a source type.
    pub fn build(self) -> Result<RegistrationDescriptor, RecordError> {
        if self.registration_type.is_source() && self.source_type.is_none() {
            return Err(RecordError::MissingField("source_type"));
        }
        Ok(RegistrationDescriptor {
            id: self.id,
            registration_uri: self.registration_uri,
            top_origin: self.top_origin,
            registrant: self.registrant,
            web_destination: self.web_destination,
            os_destination: self.os_destination,
            verified_destination: self.verified_destination,
            registration_type: self.registration_type,
            source_type: self.source_type,
            request_time: self.request_time,
            retry_count: self.retry_count,
            debug_key_allowed: self.debug_key_allowed,
            ad_id_permission: self.ad_id_permission,
            platform_ad_id: self.platform_ad_id,
            registration_id: self.registration_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_source_descriptor_requires_source_type() {
        let result = RegistrationDescriptor::builder(
            RegistrationType::AppSource,
            url("https://ad-tech.test/register"),
            url("android-app://com.publisher"),
            url("android-app://com.publisher"),
        )
        .build();
        assert_eq!(result, Err(RecordError::MissingField("source_type")));
    }

    #[test]
    fn test_trigger_descriptor_without_source_type() {
        let descriptor = RegistrationDescriptor::builder(
            RegistrationType::WebTrigger,
            url("https://ad-tech.test/register"),
            url("https://advertiser.test"),
            url("android-app://com.browser"),
        )
        .retry_count(2)
        .ad_id_permission(true)
        .build()
        .expect("trigger descriptor should build");
        assert!(descriptor.is_web_request());
        assert_eq!(descriptor.source_type(), None);
        assert_eq!(descriptor.retry_count(), 2);
        assert!(descriptor.ad_id_permission());
    }

    #[test]
    fn test_surface_type_from_registration_type() {
        assert_eq!(
            EventSurfaceType::from(RegistrationType::WebSource),
            EventSurfaceType::Web
        );
        assert_eq!(
            EventSurfaceType::from(RegistrationType::AppTrigger),
            EventSurfaceType::App
        );
    }
}
