//! Integration tests for the reqwest transport against a local mock server.
//!
//! These tests verify:
//! - Registrations are sent as `POST` with the request headers attached
//! - Redirects are returned to the caller instead of being followed
//! - Every status code is surfaced as a response, not an error
//! - Connection failures and timeouts map onto `TransportError`

use std::time::Duration;

use registration_fetcher::{ClientOptions, RegistrationTransport, ReqwestTransport, TransportError};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> ReqwestTransport {
    ReqwestTransport::new(&ClientOptions::default()).expect("Failed to build transport")
}

fn endpoint(server: &MockServer, path: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), path)).expect("Invalid mock server URL")
}

#[tokio::test]
async fn test_post_sends_request_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/source"))
        .and(header("Attribution-Reporting-Source-Info", "navigation"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let response = transport()
        .post(
            &endpoint(&server, "/source"),
            &[("Attribution-Reporting-Source-Info", "navigation".to_string())],
        )
        .await
        .expect("Request failed");

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_response_headers_are_collected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Attribution-Reporting-Register-Trigger",
                    r#"{"event_trigger_data":[]}"#,
                )
                .append_header("Attribution-Reporting-Redirect", "https://a.test/1")
                .append_header("Attribution-Reporting-Redirect", "https://a.test/2"),
        )
        .mount(&server)
        .await;

    let response = transport()
        .post(&endpoint(&server, "/trigger"), &[])
        .await
        .expect("Request failed");

    assert!(response.is_success_or_redirect());
    assert_eq!(
        response.headers.first("Attribution-Reporting-Register-Trigger"),
        Some(r#"{"event_trigger_data":[]}"#)
    );
    assert_eq!(
        response.headers.get_all("Attribution-Reporting-Redirect"),
        vec!["https://a.test/1", "https://a.test/2"]
    );
    assert!(response.headers.characters_len() > 0);
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/first"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/second"))
        .mount(&server)
        .await;
    Mock::given(path("/second"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let response = transport()
        .post(&endpoint(&server, "/first"), &[])
        .await
        .expect("Request failed");

    assert_eq!(response.status, 302);
    assert_eq!(response.headers.first("location"), Some("/second"));
}

#[tokio::test]
async fn test_server_error_is_a_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let response = transport()
        .post(&endpoint(&server, "/trigger"), &[])
        .await
        .expect("Request failed");

    assert_eq!(response.status, 500);
    assert!(!response.is_success_or_redirect());
}

#[tokio::test]
async fn test_closed_port_is_connect_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);

    let uri = Url::parse(&format!("http://127.0.0.1:{port}/trigger")).expect("Invalid URL");
    let result = transport().post(&uri, &[]).await;

    assert!(
        matches!(result, Err(TransportError::Connect(_))),
        "unexpected result: {result:?}"
    );
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let options = ClientOptions {
        timeout: Duration::from_millis(200),
        ..ClientOptions::default()
    };
    let transport = ReqwestTransport::new(&options).expect("Failed to build transport");
    let result = transport.post(&endpoint(&server, "/trigger"), &[]).await;

    assert_eq!(result, Err(TransportError::Timeout));
}
