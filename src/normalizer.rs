//! Response normalizer: every API call goes through [`ResponseNormalizer::execute`].
//!
//! For one request it
//! 1. reads the credential and session epoch,
//! 2. sends the request,
//! 3. classifies the outcome,
//! 4. performs the side effects (notification, sign-out),
//! 5. returns the payload or the classified error.
//!
//! Nothing is retried. A failure is final for this call.

use crate::classify::{classify_outcome, AuthExemptions, TransportOutcome, Verdict};
use crate::envelope::Payload;
use crate::error_kind::ErrorKind;
use crate::notify::{Notifier, Severity};
use crate::session::SessionStore;
use crate::transport::{ApiRequest, Transport};
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub struct ResponseNormalizer {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    exemptions: AuthExemptions,
}

impl ResponseNormalizer {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        exemptions: AuthExemptions,
    ) -> Self {
        Self {
            transport,
            session,
            notifier,
            exemptions,
        }
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn exemptions(&self) -> &AuthExemptions {
        &self.exemptions
    }

    /// Sends `request` and resolves to the envelope payload or a classified error.
    pub async fn execute(&self, request: ApiRequest) -> Result<Payload> {
        let epoch = self.session.epoch();
        let credential = self.session.current_credential();
        let start = Instant::now();

        let outcome = self.transport.send(&request, credential.as_deref()).await?;
        let verdict = classify_outcome(&request.path, &outcome, &self.exemptions);
        self.apply(&request, &outcome, &verdict, epoch, start);

        Ok(verdict.result?)
    }

    fn apply(
        &self,
        request: &ApiRequest,
        outcome: &TransportOutcome,
        verdict: &Verdict,
        epoch: u64,
        start: Instant,
    ) {
        let path = request.path.as_str();
        let duration_ms = start.elapsed().as_millis() as u64;

        let err = match &verdict.result {
            Ok(_) => {
                debug!(
                    method = request.method.as_str(),
                    path,
                    duration_ms,
                    "request succeeded"
                );
                return;
            }
            Err(err) => err,
        };

        match (err.kind, outcome) {
            (ErrorKind::Network, TransportOutcome::NoResponse { reason }) => {
                error!(path, duration_ms, reason = reason.as_str(), "no response from server");
            }
            (ErrorKind::MalformedResponse, TransportOutcome::Response { status, body }) => {
                error!(
                    path,
                    http_status = *status,
                    body = truncate(body, 256),
                    "failed to parse API response"
                );
            }
            (ErrorKind::Validation, _) => {
                warn!(
                    path,
                    http_status = err.http_status,
                    envelope_code = err.envelope_code,
                    message = err.message.as_str(),
                    "request rejected by validation"
                );
            }
            _ => {
                error!(
                    path,
                    kind = err.kind.name(),
                    http_status = err.http_status,
                    envelope_code = err.envelope_code,
                    duration_ms,
                    message = err.message.as_str(),
                    "API request failed"
                );
            }
        }

        if verdict.sign_out {
            if self.session.clear_if_epoch(epoch) {
                info!(path, "authentication failed; session cleared");
            } else {
                debug!(path, "authentication failed; no current session to clear");
            }
        }

        let severity = verdict.severity.unwrap_or(Severity::Error);
        self.notifier.notify(severity, &err.message);
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
