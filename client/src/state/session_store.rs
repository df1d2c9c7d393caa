//! # Session Store
//!
//! Holds the authenticated session (user identity and bearer token) and tells
//! subscribers when the identity changes. Token renewals for the same user are
//! stored silently.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

use crate::domain::models::session::{Session, User};
use crate::state::subscribers::{Subscribers, Subscription};

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    session: Mutex<Option<Session>>,
    subscribers: Arc<Subscribers<Option<User>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                session: Mutex::new(None),
                subscribers: Subscribers::new(),
            }),
        }
    }

    /// Store a session, notifying subscribers when the user changed
    pub fn login(&self, session: Session) {
        let user = session.user.clone();
        let changed = {
            let mut current = self.lock();
            let changed = current.as_ref().map(|s| s.user.id.as_str()) != Some(user.id.as_str());
            *current = Some(session);
            changed
        };

        if changed {
            info!("👤 Session started for user {}", user.id);
            self.inner.subscribers.notify(&Some(user));
        }
    }

    /// Forget the session, notifying subscribers if there was one
    pub fn logout(&self) {
        let previous = self.lock().take();
        if let Some(previous) = previous {
            info!("👋 Session ended for user {}", previous.user.id);
            self.inner.subscribers.notify(&None);
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.lock().as_ref().map(|s| s.user.clone())
    }

    pub fn user_id(&self) -> Option<String> {
        self.lock().as_ref().map(|s| s.user.id.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.lock().as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }

    /// Subscribe to identity changes; `None` means logged out
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Option<User>) + Send + Sync + 'static,
    {
        self.inner.subscribers.subscribe(callback)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.inner.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
