use crate::client::core::GossipClient;
use crate::config::ClientConfig;
use crate::normalizer::ResponseNormalizer;
use crate::notify::{DedupNotifier, Notifier, TracingNotifier};
use crate::session::{MemorySessionStore, SessionStore};
use crate::transport::{HttpTransport, Transport};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating clients with custom configuration.
///
/// Anything not set explicitly falls back to the environment (see
/// [`crate::config`]), then to defaults.
pub struct GossipClientBuilder {
    server_url: Option<String>,
    api_version: Option<String>,
    timeout: Option<Duration>,
    proxy: Option<String>,
    extra_exempt_paths: Vec<String>,
    dedup_window: Option<Duration>,
    session: Option<Arc<dyn SessionStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    transport: Option<Arc<dyn Transport>>,
}

impl GossipClientBuilder {
    pub fn new() -> Self {
        Self {
            server_url: None,
            api_version: None,
            timeout: None,
            proxy: None,
            extra_exempt_paths: Vec::new(),
            dedup_window: None,
            session: None,
            notifier: None,
            transport: None,
        }
    }

    /// Server origin, e.g. `https://api.gossip.app`.
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// API version segment appended to the origin, e.g. `/api/v1`.
    pub fn api_version(mut self, segment: impl Into<String>) -> Self {
        self.api_version = Some(segment.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy = Some(url.into());
        self
    }

    /// Adds a path substring for which a 401 does not sign the user out.
    pub fn exempt_path(mut self, pattern: impl Into<String>) -> Self {
        self.extra_exempt_paths.push(pattern.into());
        self
    }

    /// Window in which an identical notification is shown only once. Zero disables dedup.
    pub fn notify_dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = Some(window);
        self
    }

    /// Inject a session store. Default is an in-memory store.
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session = Some(store);
        self
    }

    /// Inject a notifier. Default logs through `tracing`.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Replace the HTTP transport, e.g. with a canned one in tests.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    fn resolve_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.server_url {
            Some(url) => {
                let mut config = ClientConfig::new(url.clone());
                config.apply_env_overrides();
                config
            }
            None => ClientConfig::from_env().map_err(|_| {
                Error::configuration_with_context(
                    "server URL must be set via builder or environment",
                    ErrorContext::new()
                        .with_field_path(crate::config::ENV_SERVER_URL)
                        .with_source("client_builder"),
                )
            })?,
        };

        if let Some(version) = &self.api_version {
            config.api_version = version.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(proxy) = &self.proxy {
            config.proxy = Some(proxy.clone());
        }
        if let Some(window) = self.dedup_window {
            config.notify_dedup_window = window;
        }
        for pattern in &self.extra_exempt_paths {
            config.exemptions = config.exemptions.clone().with_pattern(pattern.clone());
        }

        config.base_url()?;
        Ok(config)
    }

    /// Build the client.
    pub fn build(self) -> Result<GossipClient> {
        let config = self.resolve_config()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(&config)?),
        };
        let session: Arc<dyn SessionStore> = self
            .session
            .unwrap_or_else(|| Arc::new(MemorySessionStore::new()));
        let inner: Arc<dyn Notifier> = self
            .notifier
            .unwrap_or_else(|| Arc::new(TracingNotifier));
        let notifier: Arc<dyn Notifier> = if config.notify_dedup_window.is_zero() {
            inner
        } else {
            Arc::new(DedupNotifier::new(inner, config.notify_dedup_window))
        };

        tracing::debug!(
            base_url = config.base_url()?.as_str(),
            exempt_paths = ?config.exemptions.patterns(),
            "gossip client ready"
        );

        let normalizer = ResponseNormalizer::new(
            transport,
            session,
            notifier,
            config.exemptions.clone(),
        );
        Ok(GossipClient {
            normalizer: Arc::new(normalizer),
            config: Arc::new(config),
        })
    }
}

impl Default for GossipClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
