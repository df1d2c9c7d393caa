//! # Authenticator
//!
//! Runs the auth flows and stores their outcome in the [`SessionStore`]. The
//! session only changes after the auth API accepted the request; refusals and
//! network failures leave it as it was, except that a token the API refuses to
//! renew ends the session.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::models::session::User;
use crate::domain::validation::{validate_credentials, validate_registration};
use crate::error::TrackerError;
use crate::io::auth::AuthGateway;
use crate::state::session_store::SessionStore;

#[derive(Clone)]
pub struct Authenticator {
    gateway: Arc<dyn AuthGateway>,
    session: SessionStore,
}

impl Authenticator {
    pub fn new(gateway: Arc<dyn AuthGateway>, session: SessionStore) -> Self {
        Self { gateway, session }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, TrackerError> {
        validate_credentials(email, password)?;
        let session = self.gateway.login(email, password).await?;
        let user = session.user.clone();
        self.session.login(session);
        Ok(user)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User, TrackerError> {
        validate_registration(username, email, password)?;
        let session = self.gateway.register(username, email, password).await?;
        info!("Registered user {}", session.user.username);
        let user = session.user.clone();
        self.session.login(session);
        Ok(user)
    }

    /// Renew the stored token.
    ///
    /// Returns `Ok(false)` when there is no session or the API refused the
    /// token, in which case the session is cleared.
    pub async fn validate_session(&self) -> Result<bool, TrackerError> {
        let Some(token) = self.session.token() else {
            return Ok(false);
        };

        match self.gateway.renew_token(&token).await {
            Ok(renewed) => {
                self.session.login(renewed);
                Ok(true)
            }
            Err(e) if e.is_rejection() => {
                warn!("Session token refused: {}", e);
                self.session.logout();
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Restore a session from a token kept by the caller
    pub async fn restore(&self, token: &str) -> Result<User, TrackerError> {
        let session = self.gateway.renew_token(token).await?;
        let user = session.user.clone();
        self.session.login(session);
        Ok(user)
    }

    pub fn logout(&self) {
        self.session.logout();
    }
}
