//! End-to-end behaviour of the response normalizer against a real HTTP server.

use crate::mock_server::{unreachable_url, MockServerFixture};
use gossip_client::notify::{RecordingNotifier, Severity};
use gossip_client::transport::ApiRequest;
use gossip_client::{ErrorKind, GossipClient, MemorySessionStore, Payload, SessionStore};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn success_with_data_returns_data_unchanged() {
    let mut fx = MockServerFixture::signed_in("tok").await;
    let mock = fx
        .mock_json("GET", "/profiles/host/7", 200, r#"{"code":200,"message":"ok","data":{"id":7}}"#)
        .await;

    let payload = fx.client().execute(ApiRequest::get("/profiles/host/7")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(payload, Payload::Data(json!({"id": 7})));
    assert!(fx.notifications().is_empty());
}

#[tokio::test]
async fn success_without_data_returns_true() {
    let mut fx = MockServerFixture::new().await;
    let _m = fx
        .mock_json("PATCH", "/profiles/update/1", 200, r#"{"code":200,"message":"ok"}"#)
        .await;

    let payload = fx.client().execute(ApiRequest::patch("/profiles/update/1")).await.unwrap();

    assert!(payload.is_done());
    assert_eq!(payload.into_value(), json!(true));
}

#[tokio::test]
async fn bad_credentials_on_sign_in_do_not_sign_out() {
    let mut fx = MockServerFixture::signed_in("previous").await;
    let _m = fx
        .mock_json("POST", "/users/sign_in", 200, r#"{"code":401,"message":"Bad credentials"}"#)
        .await;

    let err = fx
        .client()
        .execute(ApiRequest::post("/users/sign_in"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::Unauthorized));
    assert_eq!(err.to_string(), "Bad credentials");
    assert_eq!(fx.session.current_credential().as_deref(), Some("previous"));
    let notes = fx.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Warning);
}

#[tokio::test]
async fn expired_session_signs_out() {
    let mut fx = MockServerFixture::signed_in("stale").await;
    let _m = fx
        .mock_json("GET", "/profiles/host/5", 200, r#"{"code":401,"message":"Session expired"}"#)
        .await;

    let err = fx
        .client()
        .execute(ApiRequest::get("/profiles/host/5"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Session expired");
    assert!(!fx.session.is_signed_in());
    assert_eq!(fx.notifications()[0].severity, Severity::Error);
}

#[tokio::test]
async fn validation_error_is_warning_tier() {
    let mut fx = MockServerFixture::new().await;
    let _m = fx
        .mock_json("POST", "/users/sign_up", 200, r#"{"code":422,"message":"Email taken"}"#)
        .await;

    let err = fx
        .client()
        .execute(ApiRequest::post("/users/sign_up"))
        .await
        .unwrap_err();

    let classified = err.as_classified().unwrap();
    assert_eq!(classified.kind, ErrorKind::Validation);
    assert_eq!(classified.message, "Email taken");
    assert_eq!(classified.envelope_code, Some(422));
    assert_eq!(classified.http_status, Some(200));
    assert_eq!(fx.notifications()[0].severity, Severity::Warning);
}

#[tokio::test]
async fn no_response_is_network_error() {
    let session = Arc::new(MemorySessionStore::new());
    session.set_auth(None, "tok".into());
    let notifier = Arc::new(RecordingNotifier::new());
    let client = GossipClient::builder()
        .server_url(unreachable_url())
        .timeout(Duration::from_secs(5))
        .session_store(session.clone())
        .notifier(notifier.clone())
        .build()
        .unwrap();

    let err = client
        .execute(ApiRequest::get("/profiles/host/5"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::Network));
    assert_eq!(err.to_string(), ErrorKind::Network.default_message());
    assert!(session.is_signed_in());
    assert_eq!(notifier.notifications()[0].severity, Severity::Error);
}

#[tokio::test]
async fn transport_401_and_403_sign_out() {
    for status in [401usize, 403] {
        let mut fx = MockServerFixture::signed_in("tok").await;
        let _m = fx.mock_text("GET", "/profiles/avatar/3", status, "").await;

        let err = fx
            .client()
            .execute(ApiRequest::get("/profiles/avatar/3"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::Unauthorized), "status {status}");
        assert_eq!(
            err.to_string(),
            format!("Request failed with status code {}", status)
        );
        assert!(!fx.session.is_signed_in(), "status {status}");
    }
}

#[tokio::test]
async fn transport_401_on_sign_up_keeps_session() {
    let mut fx = MockServerFixture::signed_in("tok").await;
    let _m = fx
        .mock_json("POST", "/users/sign_up", 401, r#"{"code":401,"message":"Not allowed"}"#)
        .await;

    let err = fx
        .client()
        .execute(ApiRequest::post("/users/sign_up"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Not allowed");
    assert!(fx.session.is_signed_in());
}

#[tokio::test]
async fn string_encoded_envelope_is_parsed() {
    let mut fx = MockServerFixture::new().await;
    let inner = r#"{"code":200,"message":"ok","data":{"id":9}}"#;
    let body = serde_json::to_string(inner).unwrap();
    let _m = fx.mock_text("GET", "/profiles/guest/9", 200, &body).await;

    let payload = fx
        .client()
        .execute(ApiRequest::get("/profiles/guest/9"))
        .await
        .unwrap();

    assert_eq!(payload, Payload::Data(json!({"id": 9})));
}

#[tokio::test]
async fn unparsable_body_is_malformed_response() {
    let mut fx = MockServerFixture::signed_in("tok").await;
    let _m = fx
        .mock_text("GET", "/profiles/search", 200, "<html>maintenance</html>")
        .await;

    let err = fx
        .client()
        .execute(ApiRequest::get("/profiles/search"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::MalformedResponse));
    assert!(fx.session.is_signed_in());
    assert_eq!(fx.notifications().len(), 1);
}

#[tokio::test]
async fn server_error_uses_envelope_message_then_default() {
    let mut fx = MockServerFixture::new().await;
    let _a = fx
        .mock_json("GET", "/profiles/host/1", 200, r#"{"code":500,"message":"Database down"}"#)
        .await;
    let _b = fx.mock_json("GET", "/profiles/host/2", 200, r#"{"code":500}"#).await;
    let client = fx.client();

    let err = client.execute(ApiRequest::get("/profiles/host/1")).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Api));
    assert_eq!(err.to_string(), "Database down");

    let err = client.execute(ApiRequest::get("/profiles/host/2")).await.unwrap_err();
    assert_eq!(err.to_string(), "An API error occurred.");
}

#[tokio::test]
async fn repeated_failures_are_deduplicated_by_default() {
    let mut fx = MockServerFixture::signed_in("tok").await;
    let _m = fx
        .mock_json("GET", "/profiles/host/5", 200, r#"{"code":401,"message":"Session expired"}"#)
        .await;
    let client = GossipClient::builder()
        .server_url(fx.server.url())
        .api_version(crate::mock_server::API_VERSION)
        .session_store(fx.session.clone())
        .notifier(fx.notifier.clone())
        .notify_dedup_window(Duration::from_secs(60))
        .build()
        .unwrap();

    for _ in 0..3 {
        let err = client.execute(ApiRequest::get("/profiles/host/5")).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Unauthorized));
    }

    assert!(!fx.session.is_signed_in());
    assert_eq!(fx.notifications().len(), 1);
}

#[tokio::test]
async fn body_cut_off_mid_read_is_network_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\n\
                  Content-Type: application/json\r\n\
                  Content-Length: 200\r\n\r\n\
                  {\"code\":200,\"da",
            )
            .await
            .unwrap();
        socket.flush().await.unwrap();
    });

    let session = Arc::new(MemorySessionStore::new());
    session.set_auth(None, "tok".into());
    let notifier = Arc::new(RecordingNotifier::new());
    let client = GossipClient::builder()
        .server_url(format!("http://{}", addr))
        .timeout(Duration::from_secs(5))
        .session_store(session.clone())
        .notifier(notifier.clone())
        .notify_dedup_window(Duration::ZERO)
        .build()
        .unwrap();

    let err = client
        .execute(ApiRequest::get("/profiles/host/5"))
        .await
        .unwrap_err();
    server.await.unwrap();

    let classified = err.as_classified().unwrap();
    assert_eq!(classified.kind, ErrorKind::Network);
    assert_eq!(classified.message, ErrorKind::Network.default_message());
    assert_eq!(classified.http_status, None);
    assert!(session.is_signed_in());
    assert_eq!(notifier.notifications()[0].severity, Severity::Error);
}
