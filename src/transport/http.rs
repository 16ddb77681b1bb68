use super::{ApiRequest, Method, RequestBody, Transport};
use crate::classify::TransportOutcome;
use crate::config::ClientConfig;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::Proxy;
use tracing::{debug, warn};
use uuid::Uuid;

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(concat!("gossip-client/", env!("CARGO_PKG_VERSION")));

        if let Some(proxy_url) = &config.proxy {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy URL: {}", e),
                    ErrorContext::new()
                        .with_field_path("config.proxy")
                        .with_source("http_transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                format!("failed to create HTTP client: {}", e),
                ErrorContext::new().with_source("http_transport"),
            )
        })?;

        Ok(Self {
            client,
            base_url: config.base_url()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn build(&self, request: &ApiRequest, credential: Option<&str>) -> Result<reqwest::RequestBuilder> {
        let url = self.url_for(&request.path);
        let mut req = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        req = match &request.body {
            RequestBody::Empty => req,
            RequestBody::Json(value) => req.json(value),
            RequestBody::Multipart(parts) => {
                let mut form = reqwest::multipart::Form::new();
                for part in parts {
                    let file = reqwest::multipart::Part::bytes(part.bytes.to_vec())
                        .file_name(part.file_name.clone())
                        .mime_str(&part.content_type)
                        .map_err(|e| {
                            Error::configuration_with_context(
                                format!("invalid content type '{}': {}", part.content_type, e),
                                ErrorContext::new().with_field_path(part.field.clone()),
                            )
                        })?;
                    form = form.part(part.field.clone(), file);
                }
                req.multipart(form)
            }
        };

        if let Some(token) = credential {
            req = req.bearer_auth(token);
        }

        Ok(req.header("accept", "application/json"))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest, credential: Option<&str>) -> Result<TransportOutcome> {
        let request_id = Uuid::new_v4().to_string();
        let req = self
            .build(request, credential)?
            .header("x-request-id", request_id.as_str());

        debug!(
            method = request.method.as_str(),
            path = request.path.as_str(),
            request_id = request_id.as_str(),
            authenticated = credential.is_some(),
            "sending request"
        );

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                return Ok(TransportOutcome::NoResponse {
                    reason: e.to_string(),
                })
            }
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => Ok(TransportOutcome::Response { status, body }),
            // A body cut off mid-read is a transport failure, not a bad envelope.
            Err(e) => {
                warn!(
                    request_id = request_id.as_str(),
                    path = request.path.as_str(),
                    http_status = status,
                    error = %e,
                    "connection failed while reading response body"
                );
                Ok(TransportOutcome::NoResponse {
                    reason: format!("failed to read response body: {}", e),
                })
            }
        }
    }
}
