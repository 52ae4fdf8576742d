//! Landlord dashboard access gate

use std::sync::Arc;

use tracing::{debug, info, warn};
use unitko_core::{check_session, Result, SessionStatus};

use super::{Navigator, Route};
use crate::state::AppState;

/// Gate progress for one mount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Checking,
    Authenticated,
    Unauthenticated,
}

/// Whether the current landlord session is usable
///
/// An expired session is signed out before reporting `false`.
pub async fn is_landlord_authenticated(state: &AppState) -> Result<bool> {
    let session = state.with_identity(|identity| identity.current_session()).await?;
    match check_session(session.as_ref()) {
        SessionStatus::Valid => Ok(true),
        SessionStatus::Absent => Ok(false),
        SessionStatus::Expired => {
            debug!("Stored session expired, signing out");
            state.with_identity(|identity| identity.sign_out()).await?;
            Ok(false)
        }
    }
}

/// Reusable authentication gate around any landlord view
///
/// Each instance is one mount: it leaves `Checking` exactly once.
pub struct LandlordGate {
    state: Arc<AppState>,
    navigator: Arc<dyn Navigator>,
    gate: GateState,
}

impl LandlordGate {
    pub fn new(state: Arc<AppState>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            state,
            navigator,
            gate: GateState::Checking,
        }
    }

    pub fn state(&self) -> GateState {
        self.gate
    }

    pub fn is_authenticated(&self) -> bool {
        self.gate == GateState::Authenticated
    }

    /// Run the authentication check and settle the gate
    pub async fn mount(&mut self) -> GateState {
        if self.gate != GateState::Checking {
            return self.gate;
        }

        let authenticated = match is_landlord_authenticated(&self.state).await {
            Ok(authenticated) => authenticated,
            Err(e) => {
                warn!(error = %e, "Authentication check failed");
                false
            }
        };

        if authenticated {
            self.gate = GateState::Authenticated;
            return self.gate;
        }

        if let Err(e) = self.state.clear_auth_artifacts().await {
            warn!(error = %e, "Failed to clear cached auth artifacts");
        }
        self.gate = GateState::Unauthenticated;
        info!("Landlord not authenticated, redirecting to login");
        self.navigator.navigate(Route::LandlordLogin);
        self.gate
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::viewmodel::testing::{Harness, OfflineIdentity};
    use unitko_core::{AppConfig, Database, IdentityStore, StorageScope, AUTH_TOKEN_KEY};

    #[tokio::test]
    async fn test_authenticated_landlord_passes() {
        let h = Harness::new();
        h.sign_up();
        h.sign_in();

        let mut gate = LandlordGate::new(h.state.clone(), h.navigator());
        assert_eq!(gate.state(), GateState::Checking);
        assert_eq!(gate.mount().await, GateState::Authenticated);
        assert!(gate.is_authenticated());
        assert!(h.navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn test_unauthenticated_redirects_and_clears_storage() {
        let h = Harness::new();
        {
            let db = h.state.db.lock().unwrap();
            db.client_storage()
                .set(StorageScope::Session, "is_navigating", "true")
                .unwrap();
            db.client_storage()
                .set(StorageScope::Local, "tenant_id", "stale")
                .unwrap();
        }

        let mut gate = LandlordGate::new(h.state.clone(), h.navigator());
        assert_eq!(gate.mount().await, GateState::Unauthenticated);
        assert_eq!(h.navigator.routes(), vec![Route::LandlordLogin]);

        let db = h.state.db.lock().unwrap();
        assert!(db
            .client_storage()
            .get(StorageScope::Session, "is_navigating")
            .unwrap()
            .is_none());
        assert!(db
            .client_storage()
            .get(StorageScope::Local, "tenant_id")
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_signed_out() {
        let h = Harness::with_session_hours(0);
        h.sign_up();
        h.sign_in();

        assert!(!is_landlord_authenticated(&h.state).await.unwrap());
        let db = h.state.db.lock().unwrap();
        assert!(db
            .client_storage()
            .get(StorageScope::Local, AUTH_TOKEN_KEY)
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_failed_check_fails_closed() {
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let state = Arc::new(AppState::from_parts(
            db,
            Arc::new(OfflineIdentity::new()),
            AppConfig::default(),
        ));
        let h = Harness::new();

        let mut gate = LandlordGate::new(state, h.navigator());
        assert_eq!(gate.mount().await, GateState::Unauthenticated);
        assert_eq!(h.navigator.routes(), vec![Route::LandlordLogin]);
    }

    #[tokio::test]
    async fn test_gate_settles_once_per_mount() {
        let h = Harness::new();
        h.sign_up();
        h.sign_in();

        let mut gate = LandlordGate::new(h.state.clone(), h.navigator());
        assert_eq!(gate.mount().await, GateState::Authenticated);

        h.accounts.sign_out().unwrap();
        assert_eq!(gate.mount().await, GateState::Authenticated);

        let mut remounted = LandlordGate::new(h.state.clone(), h.navigator());
        assert_eq!(remounted.mount().await, GateState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_gate_wraps_independent_views() {
        let h = Harness::new();
        h.sign_up();
        h.sign_in();

        let mut dashboard = LandlordGate::new(h.state.clone(), h.navigator());
        let mut history = LandlordGate::new(h.state.clone(), h.navigator());
        assert!(dashboard.mount().await == GateState::Authenticated);
        assert!(history.mount().await == GateState::Authenticated);
    }
}
