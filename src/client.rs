//! Gossip API client.
//!
//! Keep the public surface small: build a [`GossipClient`] with
//! [`GossipClientBuilder`], then call the typed operations. Each operation is
//! one request through the response normalizer.

mod auth;
pub mod builder;
pub mod core;
mod profiles;

pub use builder::GossipClientBuilder;
pub use self::core::{paths, GossipClient};
pub use profiles::{AvatarUpload, SearchQuery, AVATAR_FIELD};
