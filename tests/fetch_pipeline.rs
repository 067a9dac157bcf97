//! End-to-end fetch tests over real HTTP.
//!
//! Registration URIs must be `https`, so the transport under test rewrites
//! each request onto the plain-HTTP mock server while keeping its path and
//! query. Everything else (client, header collection, enrollment, parsing and
//! status reporting) runs as in production.

use std::sync::Arc;

use async_trait::async_trait;
use registration_fetcher::{
    ClientOptions, EntityStatus, FetchStatus, LogRegistrationLogger, MeasurementConfig,
    RedirectAccumulator, RedirectKind, RegistrationDescriptor, RegistrationTransport,
    RegistrationType, ReqwestTransport, ResponseStatus, SourceType, StaticEnrollmentResolver,
    SourceFetcher, TransportError, TransportResponse, TriggerFetcher,
};
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Sends every registration to the mock server.
struct LoopbackTransport {
    inner: ReqwestTransport,
    server: Url,
}

impl LoopbackTransport {
    fn new(server: &MockServer) -> Self {
        Self {
            inner: ReqwestTransport::new(&ClientOptions::default())
                .expect("Failed to build transport"),
            server: Url::parse(&server.uri()).expect("Invalid mock server URL"),
        }
    }
}

#[async_trait]
impl RegistrationTransport for LoopbackTransport {
    async fn post(
        &self,
        uri: &Url,
        request_headers: &[(&'static str, String)],
    ) -> Result<TransportResponse, TransportError> {
        let mut target = self.server.clone();
        target.set_path(uri.path());
        target.set_query(uri.query());
        self.inner.post(&target, request_headers).await
    }
}

fn enrollment() -> Arc<StaticEnrollmentResolver> {
    Arc::new(StaticEnrollmentResolver::new().with_enrollment("https://ad-tech.test", "enrollment-1"))
}

fn trigger_fetcher(server: &MockServer) -> TriggerFetcher<LoopbackTransport> {
    TriggerFetcher::new(
        LoopbackTransport::new(server),
        MeasurementConfig::default(),
        enrollment(),
        Arc::new(LogRegistrationLogger),
    )
}

fn trigger_descriptor(path: &str) -> RegistrationDescriptor {
    RegistrationDescriptor::builder(
        RegistrationType::AppTrigger,
        Url::parse(&format!("https://ad-tech.test{path}")).expect("Invalid URL"),
        Url::parse("android-app://com.advertiser").expect("Invalid URL"),
        Url::parse("android-app://com.advertiser").expect("Invalid URL"),
    )
    .build()
    .expect("Invalid descriptor")
}

#[tokio::test]
async fn test_trigger_end_to_end() {
    let server = MockServer::start().await;
    let event_trigger_data = json!([{
        "trigger_data": "7",
        "priority": "1",
        "deduplication_key": "100",
        "filters": [{"source_type": ["navigation"], "key_1": ["value_1"]}],
    }]);
    let payload = json!({ "event_trigger_data": event_trigger_data }).to_string();
    Mock::given(method("POST"))
        .and(path("/trigger"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Attribution-Reporting-Register-Trigger", payload.as_str())
                .insert_header("Attribution-Reporting-Redirect", "https://other.test/r"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut status = FetchStatus::new();
    let mut redirects = RedirectAccumulator::new();
    let trigger = trigger_fetcher(&server)
        .fetch_trigger(&trigger_descriptor("/trigger"), &mut status, &mut redirects)
        .await
        .expect("No trigger");

    assert_eq!(status.response_status, Some(ResponseStatus::Success));
    assert_eq!(status.entity_status, Some(EntityStatus::Success));
    assert!(status.response_size > payload.len() as u64);
    assert_eq!(trigger.enrollment_id, "enrollment-1");
    assert_eq!(trigger.registration_origin, "https://ad-tech.test");
    assert_eq!(
        trigger.event_triggers_json().expect("Invalid event triggers"),
        event_trigger_data
    );
    assert_eq!(redirects.get(RedirectKind::List), ["https://other.test/r"]);
}

#[tokio::test]
async fn test_trigger_redirect_then_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/first"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "https://ad-tech.test/second"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(200).insert_header(
            "Attribution-Reporting-Register-Trigger",
            r#"{"event_trigger_data":[{"trigger_data":"1"}]}"#,
        ))
        .mount(&server)
        .await;

    let fetcher = trigger_fetcher(&server);
    let mut redirects = RedirectAccumulator::new();

    let mut first = FetchStatus::new();
    let hop = fetcher
        .fetch_trigger(&trigger_descriptor("/first"), &mut first, &mut redirects)
        .await;
    assert!(hop.is_none());
    assert_eq!(first.entity_status, Some(EntityStatus::HeaderMissing));
    assert!(first.redirect_only);

    let next = redirects.get(RedirectKind::Location)[0].clone();
    let next_path = Url::parse(&next).expect("Invalid redirect").path().to_string();

    let mut second = FetchStatus::new();
    let hop = fetcher
        .fetch_trigger(&trigger_descriptor(&next_path), &mut second, &mut redirects)
        .await;
    assert!(hop.is_some());
    assert_eq!(second.entity_status, Some(EntityStatus::Success));
}

#[tokio::test]
async fn test_trigger_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut status = FetchStatus::new();
    let trigger = trigger_fetcher(&server)
        .fetch_trigger(
            &trigger_descriptor("/trigger"),
            &mut status,
            &mut RedirectAccumulator::new(),
        )
        .await;

    assert!(trigger.is_none());
    assert_eq!(status.response_status, Some(ResponseStatus::ServerUnavailable));
    assert_eq!(status.entity_status, None);
}

#[tokio::test]
async fn test_source_end_to_end() {
    let server = MockServer::start().await;
    let payload = json!({
        "destination": "android-app://com.advertiser",
        "source_event_id": "1234",
        "priority": "10",
        "expiry": "172800",
        "filter_data": {"product": ["shoes"]},
        "aggregation_keys": {"campaign": "0x159"},
    })
    .to_string();
    Mock::given(method("POST"))
        .and(path("/source"))
        .and(header("Attribution-Reporting-Source-Info", "event"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Attribution-Reporting-Register-Source", payload.as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let descriptor = RegistrationDescriptor::builder(
        RegistrationType::AppSource,
        Url::parse("https://ad-tech.test/source").expect("Invalid URL"),
        Url::parse("android-app://com.publisher").expect("Invalid URL"),
        Url::parse("android-app://com.publisher").expect("Invalid URL"),
    )
    .source_type(SourceType::Event)
    .request_time(1_000)
    .build()
    .expect("Invalid descriptor");
    let fetcher = SourceFetcher::new(
        LoopbackTransport::new(&server),
        MeasurementConfig::default(),
        enrollment(),
        Arc::new(LogRegistrationLogger),
    );

    let mut status = FetchStatus::new();
    let source = fetcher
        .fetch_source(&descriptor, &mut status, &mut RedirectAccumulator::new())
        .await
        .expect("No source");

    assert_eq!(status.entity_status, Some(EntityStatus::Success));
    assert_eq!(source.event_id.value(), 1234);
    assert_eq!(source.priority, 10);
    assert_eq!(source.expiry_time, 1_000 + 172_800_000);
    assert_eq!(source.app_destinations, vec!["android-app://com.advertiser"]);
    let aggregate: Value = serde_json::from_str(
        source.aggregate_source.as_deref().expect("No aggregation keys"),
    )
    .expect("Invalid aggregation keys");
    assert_eq!(aggregate, json!({"campaign": "0x159"}));
}
