//! Mock HTTP server setup for integration tests

use gossip_client::notify::{Notification, RecordingNotifier};
use gossip_client::{GossipClient, MemorySessionStore, SessionStore};
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::sync::Arc;
use std::time::Duration;

pub const API_VERSION: &str = "/api/v1";

/// Test fixture that owns a mock server plus the collaborators the client
/// under test reports into.
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub session: Arc<MemorySessionStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        Self {
            server: Server::new_async().await,
            session: Arc::new(MemorySessionStore::new()),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    /// Fixture whose session already holds `token`.
    pub async fn signed_in(token: &str) -> Self {
        let fixture = Self::new().await;
        fixture.session.set_auth(None, token.to_string());
        fixture
    }

    /// Client pointed at the mock server, with dedup off so every
    /// notification is observable.
    pub fn client(&self) -> GossipClient {
        GossipClient::builder()
            .server_url(self.server.url())
            .api_version(API_VERSION)
            .session_store(self.session.clone())
            .notifier(self.notifier.clone())
            .notify_dedup_window(Duration::ZERO)
            .build()
            .expect("client builds against mock server")
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifier.notifications()
    }

    /// Mock answering `method path` with `status` and a JSON body.
    pub async fn mock_json(&mut self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock(method, format!("{}{}", API_VERSION, path).as_str())
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Mock answering with a text body, as servers with a wrong content type do.
    pub async fn mock_text(&mut self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock(method, format!("{}{}", API_VERSION, path).as_str())
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "text/plain")
            .with_body(body)
            .create_async()
            .await
    }
}

/// A base URL nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
