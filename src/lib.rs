//! # gossip-client
//!
//! Async client for the Gossip social API.
//!
//! ## Overview
//!
//! Every Gossip endpoint answers with the same envelope:
//!
//! ```json
//! { "code": 200, "message": "ok", "data": { "id": 7 } }
//! ```
//!
//! This crate sends requests, unwraps that envelope and turns every failure
//! into one [`ClassifiedError`], whether it came from the envelope `code` or
//! from the HTTP status. Failures are announced through a [`Notifier`], and an
//! expired session is cleared from the [`SessionStore`] so later requests stop
//! sending a stale credential.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gossip_client::{GossipClient, SearchQuery, SignInForm};
//!
//! #[tokio::main]
//! async fn main() -> gossip_client::Result<()> {
//!     let client = GossipClient::builder()
//!         .server_url("https://api.gossip.app")
//!         .api_version("/api/v1")
//!         .build()?;
//!
//!     client.sign_in(&SignInForm::new("amy", "secret1")).await?;
//!     let page = client.search_profiles(&SearchQuery::new("tran")).await?;
//!     for profile in &page.data {
//!         println!("{} {}", profile.id, profile.full_name());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client, builder and typed endpoints |
//! | [`normalizer`] | Sends a request and applies side effects of its outcome |
//! | [`classify`] | Pure outcome classification and auth-exempt paths |
//! | [`envelope`] | The `{code, message, data}` wrapper and [`Payload`] |
//! | [`error_kind`] | Failure taxonomy |
//! | [`session`] | Credential and identity storage |
//! | [`notify`] | Notification surface |
//! | [`forms`] | Client-side form validation |
//! | [`models`] | Users, profiles, search pages |
//! | [`transport`] | HTTP transport |
//! | [`config`] | Configuration and environment variables |

pub mod classify;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error_kind;
pub mod forms;
pub mod models;
pub mod normalizer;
pub mod notify;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use classify::{classify_outcome, AuthExemptions, TransportOutcome, Verdict};
pub use client::{AvatarUpload, GossipClient, GossipClientBuilder, SearchQuery};
pub use config::ClientConfig;
pub use envelope::{Envelope, Payload};
pub use error_kind::ErrorKind;
pub use forms::{FormErrors, ProfileUpdate, SignInForm, SignUpForm};
pub use models::{ActivationStatus, Profile, SearchPage, SignInResponse, User};
pub use notify::{Notifier, Severity};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{ClassifiedError, Error, ErrorContext};
