//! Identity Session Store
//!
//! The landlord-side authentication collaborator: current session lookup,
//! sign-in, sign-out, refresh, and a change-notification feed.

mod local;

use tokio::sync::broadcast;
use tracing::warn;

use crate::error::Result;
use crate::models::Session;

pub use local::{LocalIdentityStore, INVALID_CREDENTIALS};

/// Client storage key holding the current access token
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Kinds of session change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// A session change, optionally carrying the session it concerns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub session: Option<Session>,
}

impl AuthEvent {
    pub fn signed_in(session: Session) -> Self {
        Self {
            kind: AuthEventKind::SignedIn,
            session: Some(session),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            kind: AuthEventKind::SignedOut,
            session: None,
        }
    }

    pub fn token_refreshed(session: Option<Session>) -> Self {
        Self {
            kind: AuthEventKind::TokenRefreshed,
            session,
        }
    }
}

/// Identity provider operations the application relies on
pub trait IdentityStore: Send + Sync {
    /// The current session, if any; may be expired
    fn current_session(&self) -> Result<Option<Session>>;

    /// Authenticate with email and password
    fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// End the current session; a no-op when signed out
    fn sign_out(&self) -> Result<()>;

    /// Extend a live session; `None` when there is nothing left to refresh
    fn refresh_session(&self) -> Result<Option<Session>>;

    /// Register for session change notifications
    fn subscribe(&self) -> AuthSubscription;
}

/// Scoped registration on the session change feed
///
/// Events arrive one at a time in delivery order. Dropping the handle drops
/// the wrapped receiver, which removes it from the channel.
pub struct AuthSubscription {
    rx: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    pub fn new(rx: broadcast::Receiver<AuthEvent>) -> Self {
        Self { rx }
    }

    /// Wait for the next event; `None` once the store is gone
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Auth subscription lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next event if one is already queued
    pub fn try_recv(&mut self) -> Option<AuthEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Auth subscription lagged, events dropped");
                }
                Err(_) => return None,
            }
        }
    }
}
