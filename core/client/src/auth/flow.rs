//! Sign-in flow controller.
//!
//! State that a browser app would keep in ambient storage (the return-to
//! location and the force-new-login flag) is held by an explicit
//! [`RedirectStore`], and navigation goes through a [`Navigator`].

use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

use photogate_common::Result;

use super::client::{AuthClient, AuthStatus, AuthorizationUrl, OperationStatus};
use super::navigator::Navigator;
use super::store::RedirectStore;

const PARAM_ERROR: &str = "error";
const PARAM_MESSAGE: &str = "message";
const PARAM_SUCCESS: &str = "success";
const DEFAULT_FAILURE_MESSAGE: &str = "Authentication failed";

/// Result of inspecting a page load for OAuth callback parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// The backend reported an OAuth error.
    Failed { error: String, message: String },
    /// Sign-in completed.
    Succeeded {
        /// Where the user was sent back to, if a location was stored.
        returned_to: Option<Url>,
        /// Whether the flow was started as a forced new login.
        forced: bool,
    },
}

pub struct AuthFlow {
    client: AuthClient,
    store: Arc<dyn RedirectStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthFlow {
    pub fn new(
        client: AuthClient,
        store: Arc<dyn RedirectStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client,
            store,
            navigator,
        }
    }

    pub fn client(&self) -> &AuthClient {
        &self.client
    }

    /// Current authentication status (fails open).
    pub async fn status(&self) -> AuthStatus {
        self.client.get_status().await
    }

    /// Start sign-in: remember `current`, then redirect to Google.
    ///
    /// On failure nothing is stored and no redirect happens.
    pub async fn initiate_login(&self, current: &Url) -> OperationStatus {
        match self.client.authorization_url().await {
            Ok(auth) => self.redirect_to_provider(current, auth),
            Err(err) => {
                error!("Error initiating Google login: {}", err);
                OperationStatus::from_error(&err)
            }
        }
    }

    /// Start sign-in that discards the current Google account choice.
    pub async fn force_new_login(&self, current: &Url) -> OperationStatus {
        match self.client.force_new_login_url().await {
            Ok(auth) => {
                if let Err(err) = self.store.set_force_new_login(true) {
                    return OperationStatus::from_error(&err);
                }
                self.redirect_to_provider(current, auth)
            }
            Err(err) => {
                error!("Error forcing new login: {}", err);
                OperationStatus::from_error(&err)
            }
        }
    }

    /// Clear backend tokens, then start a normal sign-in.
    pub async fn sign_in(&self, current: &Url) -> OperationStatus {
        if let Err(err) = self.client.clear_tokens().await {
            warn!("Could not clear existing tokens: {}", err);
        }
        self.initiate_login(current).await
    }

    fn redirect_to_provider(&self, current: &Url, auth: AuthorizationUrl) -> OperationStatus {
        let result = self
            .store
            .save_return_to(current)
            .and_then(|_| self.navigator.redirect(&auth.url));

        match result {
            Ok(()) => {
                info!("Redirecting to Google auth URL");
                OperationStatus::ok("Redirecting to Google sign-in")
            }
            Err(err) => {
                error!("Error redirecting to Google: {}", err);
                OperationStatus::from_error(&err)
            }
        }
    }

    /// Inspect `current` for OAuth callback parameters.
    ///
    /// If `error` or `success=true` is present, the callback parameters are
    /// removed from the visible location. On success the stored return-to
    /// location is consumed and, if there was one, visited exactly once.
    pub fn handle_auth_redirect(&self, current: &Url) -> Result<Option<RedirectOutcome>> {
        let mut error = None;
        let mut message = None;
        let mut success = false;
        for (key, value) in current.query_pairs() {
            match key.as_ref() {
                PARAM_ERROR => error = Some(value.into_owned()),
                PARAM_MESSAGE => message = Some(value.into_owned()),
                PARAM_SUCCESS => success = value == "true",
                _ => {}
            }
        }

        if let Some(error) = error {
            let message = message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
            error!("Auth error: {} {}", error, message);
            self.navigator.replace(&strip_callback_params(current))?;
            return Ok(Some(RedirectOutcome::Failed { error, message }));
        }

        if success {
            self.navigator.replace(&strip_callback_params(current))?;
            let forced = self.store.take_force_new_login()?;
            let returned_to = self.store.take_return_to()?;
            if let Some(location) = &returned_to {
                info!("Authentication succeeded, returning to {}", location);
                self.navigator.redirect(location)?;
            }
            return Ok(Some(RedirectOutcome::Succeeded {
                returned_to,
                forced,
            }));
        }

        Ok(None)
    }

    /// Log out of the backend session.
    pub async fn logout(&self) -> OperationStatus {
        self.client.logout().await
    }
}

/// `url` with the OAuth callback parameters removed; other parameters are
/// kept in order.
pub fn strip_callback_params(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !matches!(k.as_ref(), PARAM_ERROR | PARAM_MESSAGE | PARAM_SUCCESS))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut cleaned = url.clone();
    if kept.is_empty() {
        cleaned.set_query(None);
    } else {
        cleaned.query_pairs_mut().clear().extend_pairs(kept);
    }
    cleaned
}
