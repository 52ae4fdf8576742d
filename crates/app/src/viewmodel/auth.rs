//! Landlord login page view model
//!
//! Reacts to session changes and performs at most one dashboard navigation
//! per authentication success.

use std::sync::Arc;

use tracing::{debug, info, warn};
use unitko_core::identity::INVALID_CREDENTIALS;
use unitko_core::{
    check_session, AuthEvent, AuthEventKind, AuthSubscription, Error, Session, SessionStatus,
};

use super::guard::is_landlord_authenticated;
use super::{Navigator, Route};
use crate::state::AppState;

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
const FRIENDLY_INVALID_CREDENTIALS: &str =
    "Invalid email or password. Please check your credentials and try again.";

/// User-facing text for a sign-in failure
pub fn sign_in_error_message(error: &Error) -> String {
    match error {
        Error::Authentication(msg) if msg == INVALID_CREDENTIALS => {
            FRIENDLY_INVALID_CREDENTIALS.to_string()
        }
        Error::Authentication(msg) => msg.clone(),
        other => other.to_string(),
    }
}

pub struct LoginController {
    state: Arc<AppState>,
    navigator: Arc<dyn Navigator>,
    navigation_attempted: bool,
    is_navigating: bool,
    is_loading: bool,
    error: Option<String>,
}

impl LoginController {
    pub fn new(state: Arc<AppState>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            state,
            navigator,
            navigation_attempted: false,
            is_navigating: false,
            is_loading: false,
            error: None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_navigating(&self) -> bool {
        self.is_navigating
    }

    pub fn navigation_attempted(&self) -> bool {
        self.navigation_attempted
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Initial session check when the login page opens
    pub async fn mount(&mut self) {
        let session = match self
            .state
            .with_identity(|identity| identity.current_session())
            .await
        {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Initial session check failed");
                return;
            }
        };

        match check_session(session.as_ref()) {
            SessionStatus::Valid => {
                if let Some(session) = session {
                    self.validate_and_navigate(session).await;
                }
            }
            SessionStatus::Expired => {
                info!("Stored session expired");
                self.expire().await;
            }
            SessionStatus::Absent => {}
        }
    }

    /// Apply one session change notification
    pub async fn handle_event(&mut self, event: AuthEvent) {
        debug!(kind = ?event.kind, has_session = event.session.is_some(), "Auth event");
        match (event.kind, event.session) {
            (AuthEventKind::SignedIn, Some(session))
            | (AuthEventKind::TokenRefreshed, Some(session)) => {
                self.validate_and_navigate(session).await;
            }
            (AuthEventKind::SignedIn, None) => {}
            (AuthEventKind::SignedOut, _) => {
                self.navigation_attempted = false;
                self.is_navigating = false;
                self.error = None;
            }
            (AuthEventKind::TokenRefreshed, None) => {
                self.expire().await;
            }
        }
    }

    /// Process events until the identity store goes away
    pub async fn run(&mut self, mut subscription: AuthSubscription) {
        while let Some(event) = subscription.recv().await {
            self.handle_event(event).await;
        }
        debug!("Auth event stream closed");
    }

    /// Process every event already queued on `subscription`
    pub async fn process_pending(&mut self, subscription: &mut AuthSubscription) {
        while let Some(event) = subscription.try_recv() {
            self.handle_event(event).await;
        }
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) {
        self.is_loading = true;
        self.error = None;

        let email = email.to_string();
        let password = password.to_string();
        let result = self
            .state
            .with_identity(move |identity| identity.sign_in(&email, &password))
            .await;
        self.is_loading = false;

        match result {
            Ok(session) => self.validate_and_navigate(session).await,
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                self.error = Some(sign_in_error_message(&e));
            }
        }
    }

    async fn validate_and_navigate(&mut self, session: Session) {
        if self.navigation_attempted {
            debug!("Navigation already attempted");
            return;
        }
        if !check_session(Some(&session)).is_valid() {
            debug!("Event session not valid, ignoring");
            return;
        }

        // Claimed before the await below so a queued event cannot navigate twice
        self.navigation_attempted = true;
        self.is_navigating = true;

        match is_landlord_authenticated(&self.state).await {
            Ok(true) => {
                info!("Landlord authenticated, opening dashboard");
                self.navigator.navigate(Route::LandlordDashboard);
            }
            Ok(false) => {
                debug!("Store no longer holds a valid session");
                self.navigation_attempted = false;
                self.is_navigating = false;
            }
            Err(e) => {
                warn!(error = %e, "Authentication check failed");
                self.navigation_attempted = false;
                self.is_navigating = false;
                self.error = Some(e.to_string());
            }
        }
    }

    async fn expire(&mut self) {
        if let Err(e) = self.state.clear_auth_artifacts().await {
            warn!(error = %e, "Failed to clear cached auth artifacts");
        }
        self.navigation_attempted = false;
        self.is_navigating = false;
        self.error = Some(SESSION_EXPIRED_MESSAGE.to_string());
    }
}
