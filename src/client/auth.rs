//! Registration, sign-in and sign-out.

use super::core::{paths, GossipClient};
use crate::envelope::Payload;
use crate::forms::{SignInForm, SignUpForm};
use crate::models::{SignInResponse, User};
use crate::notify::Severity;
use crate::transport::ApiRequest;
use crate::{Error, ErrorContext, Result};
use serde_json::json;
use tracing::{error, info};

impl GossipClient {
    /// Registers a new account. The server then emails an activation link.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<Payload> {
        form.validate()?;
        let request = ApiRequest::post(paths::SIGN_UP).json(json!({ "user": form }));
        let payload = self.execute(request).await?;
        info!(username = form.username.as_str(), "account registered");
        self.notifier().notify(
            Severity::Success,
            "Registration successful! Please check your email.",
        );
        Ok(payload)
    }

    /// Signs in and stores the returned credential in the session.
    pub async fn sign_in(&self, form: &SignInForm) -> Result<SignInResponse> {
        form.validate()?;
        let request = ApiRequest::post(paths::SIGN_IN).json(json!({ "user": form }));
        let payload = self.execute(request).await?.into_value();

        let Some(response) = SignInResponse::from_value(&payload) else {
            error!("sign-in succeeded but the payload carried no access token");
            return Err(Error::runtime_with_context(
                "sign-in response carried no access token",
                ErrorContext::new()
                    .with_field_path("data.token")
                    .with_source("sign_in"),
            ));
        };

        self.session()
            .set_auth(response.user.clone(), response.access_token.clone());
        info!(
            user_id = response.user.as_ref().map(|u| u.id),
            "signed in"
        );
        let welcome = match &response.user {
            Some(user) => format!("Welcome back, {}!", user.display_name()),
            None => "Welcome back!".to_string(),
        };
        self.notifier().notify(Severity::Success, &welcome);
        Ok(response)
    }

    /// Forgets the local session. Returns `false` if nobody was signed in.
    pub fn sign_out(&self) -> bool {
        let cleared = self.session().clear_session();
        if cleared {
            info!("signed out");
            self.notifier().notify(Severity::Info, "You have been signed out.");
        }
        cleared
    }

    /// The identity stored at sign-in, if any.
    pub fn current_user(&self) -> Option<User> {
        self.session().user()
    }
}
