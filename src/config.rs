//! Client configuration.
//!
//! The base URL is assembled from two values, the server origin and the API
//! version segment, each of which can come from the environment:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `GOSSIP_API_SERVER_URL` | server origin, e.g. `https://api.gossip.app` | required |
//! | `GOSSIP_API_V1_SERVER` | version segment, e.g. `/api/v1` | empty |
//! | `GOSSIP_HTTP_TIMEOUT_SECS` | per-request timeout | `30` |
//! | `GOSSIP_HTTP_POOL_MAX_IDLE_PER_HOST` | idle connections kept per host | `8` |
//! | `GOSSIP_PROXY_URL` | proxy for all requests | none |

use crate::classify::AuthExemptions;
use crate::notify::DedupNotifier;
use crate::{Error, ErrorContext, Result};
use std::env;
use std::time::Duration;

pub const ENV_SERVER_URL: &str = "GOSSIP_API_SERVER_URL";
pub const ENV_API_VERSION: &str = "GOSSIP_API_V1_SERVER";
pub const ENV_TIMEOUT_SECS: &str = "GOSSIP_HTTP_TIMEOUT_SECS";
pub const ENV_POOL_MAX_IDLE: &str = "GOSSIP_HTTP_POOL_MAX_IDLE_PER_HOST";
pub const ENV_PROXY_URL: &str = "GOSSIP_PROXY_URL";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub api_version: String,
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub proxy: Option<String>,
    pub exemptions: AuthExemptions,
    /// Identical notifications inside this window are shown once.
    pub notify_dedup_window: Duration,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            api_version: String::new(),
            timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 8,
            proxy: None,
            exemptions: AuthExemptions::default(),
            notify_dedup_window: DedupNotifier::DEFAULT_WINDOW,
        }
    }

    /// Reads every setting from the environment.
    pub fn from_env() -> Result<Self> {
        let server_url = env::var(ENV_SERVER_URL).map_err(|_| {
            Error::configuration_with_context(
                "server URL is not set",
                ErrorContext::new()
                    .with_field_path(ENV_SERVER_URL)
                    .with_source("client_config"),
            )
        })?;
        let mut config = Self::new(server_url);
        config.apply_env_overrides();
        Ok(config)
    }

    /// Overwrites optional settings with any that are present in the environment.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(version) = env::var(ENV_API_VERSION) {
            self.api_version = version;
        }
        if let Some(secs) = env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| *s > 0)
        {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(n) = env::var(ENV_POOL_MAX_IDLE)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
        {
            self.pool_max_idle_per_host = n;
        }
        if let Ok(proxy) = env::var(ENV_PROXY_URL) {
            if !proxy.trim().is_empty() {
                self.proxy = Some(proxy);
            }
        }
    }

    /// `server_url` + `api_version`, without a trailing slash.
    pub fn base_url(&self) -> Result<String> {
        let origin = self.server_url.trim().trim_end_matches('/');
        let version = self.api_version.trim().trim_matches('/');
        let joined = if version.is_empty() {
            origin.to_string()
        } else {
            format!("{}/{}", origin, version)
        };

        let parsed = url::Url::parse(&joined).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL '{}': {}", joined, e),
                ErrorContext::new()
                    .with_field_path("config.server_url")
                    .with_source("client_config"),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                format!("unsupported URL scheme '{}'", parsed.scheme()),
                ErrorContext::new().with_field_path("config.server_url"),
            ));
        }
        Ok(joined)
    }
}
