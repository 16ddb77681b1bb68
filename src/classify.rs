//! Turns a raw transport outcome into either a payload or a classified error.
//!
//! [`classify_outcome`] is pure: it decides, but performs no side effects. The
//! returned [`Verdict`] tells the caller whether to sign out and which
//! notification tier to use. Both failure channels (the envelope `code` and
//! the HTTP status) are folded into one decision here.

use crate::envelope::{Envelope, Payload};
use crate::error::ClassifiedError;
use crate::error_kind::{ErrorKind, CODE_OK};
use crate::notify::Severity;

/// Path substrings for which a 401 means "wrong credentials", not "session expired".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthExemptions {
    patterns: Vec<String>,
}

impl AuthExemptions {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| path.contains(p.as_str()))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for AuthExemptions {
    fn default() -> Self {
        Self::new(["sign_in", "sign_up"])
    }
}

/// What came back from the transport for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportOutcome {
    /// No response object: connection refused, DNS failure, timeout.
    NoResponse { reason: String },
    Response { status: u16, body: String },
}

/// Decision for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub result: Result<Payload, ClassifiedError>,
    /// Clear the session that issued the request.
    pub sign_out: bool,
    /// Notification tier, or `None` on success.
    pub severity: Option<Severity>,
}

/// Message used when the transport delivered a non-2xx status.
pub fn transport_message(status: u16) -> String {
    format!("Request failed with status code {}", status)
}

/// Classifies one transport outcome for the request at `path`.
pub fn classify_outcome(
    path: &str,
    outcome: &TransportOutcome,
    exemptions: &AuthExemptions,
) -> Verdict {
    let exempt = exemptions.is_exempt(path);

    let error = match outcome {
        TransportOutcome::NoResponse { .. } => {
            ClassifiedError::new(ErrorKind::Network, ErrorKind::Network.default_message(), path)
        }
        TransportOutcome::Response { status, body } => {
            let status = *status;
            let transport_ok = (200..300).contains(&status);
            match Envelope::parse(body) {
                Ok(envelope) if transport_ok && envelope.is_success() => {
                    return Verdict {
                        result: Ok(envelope.into_payload()),
                        sign_out: false,
                        severity: None,
                    };
                }
                Ok(envelope) => {
                    let kind = if ErrorKind::is_auth_status(status) {
                        ErrorKind::Unauthorized
                    } else if envelope.code == Some(CODE_OK) {
                        // 200 in the envelope does not rescue a failed transport.
                        ErrorKind::Api
                    } else {
                        ErrorKind::from_envelope_code(envelope.code)
                    };
                    let message = envelope
                        .message
                        .clone()
                        .or_else(|| (!transport_ok).then(|| transport_message(status)))
                        .unwrap_or_else(|| default_message(kind, exempt).to_string());
                    ClassifiedError::new(kind, message, path)
                        .with_http_status(status)
                        .with_envelope_code(envelope.code)
                }
                Err(_) if transport_ok => ClassifiedError::new(
                    ErrorKind::MalformedResponse,
                    ErrorKind::MalformedResponse.default_message(),
                    path,
                )
                .with_http_status(status),
                Err(_) => {
                    let kind = if ErrorKind::is_auth_status(status) {
                        ErrorKind::Unauthorized
                    } else {
                        ErrorKind::Api
                    };
                    ClassifiedError::new(kind, transport_message(status), path)
                        .with_http_status(status)
                }
            }
        }
    };

    let sign_out = error.kind == ErrorKind::Unauthorized && !exempt;
    let severity = if error.kind == ErrorKind::Unauthorized && exempt {
        Severity::Warning
    } else {
        error.kind.severity()
    };
    Verdict {
        result: Err(error),
        sign_out,
        severity: Some(severity),
    }
}

fn default_message(kind: ErrorKind, exempt: bool) -> &'static str {
    if kind == ErrorKind::Unauthorized && exempt {
        "Invalid credentials."
    } else {
        kind.default_message()
    }
}
