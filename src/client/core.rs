use crate::config::ClientConfig;
use crate::envelope::Payload;
use crate::normalizer::ResponseNormalizer;
use crate::notify::Notifier;
use crate::session::SessionStore;
use crate::transport::ApiRequest;
use crate::Result;
use std::sync::Arc;

/// Request paths, relative to the base URL.
pub mod paths {
    pub const SIGN_IN: &str = "/users/sign_in";
    pub const SIGN_UP: &str = "/users/sign_up";
    pub const PROFILE_SEARCH: &str = "/profiles/search";

    pub fn host_profile(user_id: u64) -> String {
        format!("/profiles/host/{}", user_id)
    }

    pub fn guest_profile(user_id: u64) -> String {
        format!("/profiles/guest/{}", user_id)
    }

    pub fn avatar(user_id: u64) -> String {
        format!("/profiles/avatar/{}", user_id)
    }

    pub fn update_profile(user_id: u64) -> String {
        format!("/profiles/update/{}", user_id)
    }
}

/// Client for the Gossip API.
///
/// Cheap to clone; clones share the session, notifier and connection pool.
#[derive(Clone)]
pub struct GossipClient {
    pub(crate) normalizer: Arc<ResponseNormalizer>,
    pub(crate) config: Arc<ClientConfig>,
}

impl GossipClient {
    pub fn builder() -> super::GossipClientBuilder {
        super::GossipClientBuilder::new()
    }

    /// Sends an arbitrary request through the response normalizer.
    pub async fn execute(&self, request: ApiRequest) -> Result<Payload> {
        self.normalizer.execute(request).await
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        self.normalizer.session()
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        self.normalizer.notifier()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
