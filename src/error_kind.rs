//! Failure taxonomy for responses coming back from the Gossip API.
//!
//! Every failed call through the response normalizer is tagged with exactly one
//! [`ErrorKind`]. The kind drives both the notification tier shown to the user
//! and the control flow of the caller.
//!
//! | Kind                | Origin                                   | Severity |
//! |---------------------|------------------------------------------|----------|
//! | `Network`           | no response object (connect, DNS, timeout) | error  |
//! | `MalformedResponse` | body could not be parsed as an envelope  | error    |
//! | `Unauthorized`      | envelope code 401, HTTP 401/403          | error / warning on auth endpoints |
//! | `Validation`        | envelope code 422                        | warning  |
//! | `Api`               | any other non-success code               | error    |
//!
//! ## Example
//!
//! ```rust
//! use gossip_client::error_kind::ErrorKind;
//! use gossip_client::notify::Severity;
//!
//! let kind = ErrorKind::from_envelope_code(Some(422));
//! assert_eq!(kind, ErrorKind::Validation);
//! assert_eq!(kind.severity(), Severity::Warning);
//! assert_eq!(kind.name(), "validation_error");
//! ```

use crate::notify::Severity;
use std::fmt;

/// Envelope code signalling success.
pub const CODE_OK: i64 = 200;
/// Envelope code signalling an unauthenticated request.
pub const CODE_UNAUTHORIZED: i64 = 401;
/// Envelope code signalling rejected input.
pub const CODE_UNPROCESSABLE: i64 = 422;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The transport failed before any response arrived.
    Network,
    /// A response arrived but its body is not a readable envelope.
    MalformedResponse,
    /// Envelope code 401, or HTTP 401/403 at the transport layer.
    Unauthorized,
    /// Envelope code 422.
    Validation,
    /// Any other non-success envelope code or HTTP status.
    Api,
}

impl ErrorKind {
    /// Returns the snake_case name used in logs.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Network => "network_error",
            Self::MalformedResponse => "malformed_response",
            Self::Unauthorized => "unauthorized",
            Self::Validation => "validation_error",
            Self::Api => "api_error",
        }
    }

    /// Message used when neither the envelope nor the transport supplied one.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Network => "Unable to reach the server. Please check your connection.",
            Self::MalformedResponse => "Failed to parse API response",
            Self::Unauthorized => "Your session has expired. Please sign in again.",
            Self::Validation => "The submitted data is invalid.",
            Self::Api => "An API error occurred.",
        }
    }

    /// Notification tier for this kind outside of auth-exempt endpoints.
    #[inline]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Validation => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Maps a non-success envelope code to its kind.
    ///
    /// A missing code is treated like any other unexpected code.
    pub fn from_envelope_code(code: Option<i64>) -> Self {
        match code {
            Some(CODE_UNAUTHORIZED) => Self::Unauthorized,
            Some(CODE_UNPROCESSABLE) => Self::Validation,
            _ => Self::Api,
        }
    }

    /// Whether an HTTP status at the transport layer means the credential was refused.
    #[inline]
    pub fn is_auth_status(status: u16) -> bool {
        status == 401 || status == 403
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
