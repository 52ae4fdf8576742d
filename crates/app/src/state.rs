//! Application state management

use std::sync::{Arc, Mutex};

use unitko_core::{AppConfig, Database, Error, IdentityStore, LocalIdentityStore, Result};

/// Main application state
///
/// Collaborator calls are synchronous; controllers reach them through
/// [`AppState::with_db`] and [`AppState::with_identity`], which run on the
/// blocking pool so the async caller suspends at each call.
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub identity: Arc<dyn IdentityStore>,
    pub config: AppConfig,
}

impl AppState {
    /// Open the configured database and a local identity store over it
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let db_path = config.database_path()?;
        let db = Arc::new(Mutex::new(Database::open(&db_path)?));
        let identity = Arc::new(LocalIdentityStore::new(db.clone(), config.session_hours));
        identity.cleanup_expired_sessions()?;

        tracing::info!(path = %db_path.display(), "Database opened");
        Ok(Self::from_parts(db, identity, config))
    }

    pub fn from_parts(
        db: Arc<Mutex<Database>>,
        identity: Arc<dyn IdentityStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            db,
            identity,
            config,
        }
    }

    /// Run `f` against the directory on the blocking pool
    pub async fn with_db<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let db = db
                .lock()
                .map_err(|_| Error::ExternalCallFailed("database lock poisoned".to_string()))?;
            f(&db)
        })
        .await
        .map_err(|e| Error::ExternalCallFailed(format!("directory task failed: {}", e)))?
    }

    /// Run `f` against the identity store on the blocking pool
    pub async fn with_identity<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn IdentityStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let identity = self.identity.clone();
        tokio::task::spawn_blocking(move || f(identity.as_ref()))
            .await
            .map_err(|e| Error::ExternalCallFailed(format!("identity task failed: {}", e)))?
    }

    /// Clear every cached client-side authentication artifact
    pub async fn clear_auth_artifacts(&self) -> Result<()> {
        let removed = self.with_db(|db| db.client_storage().clear_all()).await?;
        tracing::debug!(removed, "Cleared cached auth artifacts");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_opens_configured_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            database_path: Some(dir.path().join("data").join("unitko.db")),
            ..AppConfig::default()
        };

        let state = AppState::new(config).unwrap();
        let version = state.with_db(|db| db.schema_version()).await.unwrap();
        assert_eq!(version, 3);
        assert!(state
            .with_identity(|identity| identity.current_session())
            .await
            .unwrap()
            .is_none());
        assert!(dir.path().join("data").join("unitko.db").exists());
    }

    #[tokio::test]
    async fn test_new_rejects_out_of_range_session_length() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            database_path: Some(dir.path().join("unitko.db")),
            session_hours: 1_000_000_000_000_000,
            ..AppConfig::default()
        };

        assert!(matches!(AppState::new(config), Err(Error::Config(_))));
        assert!(!dir.path().join("unitko.db").exists());
    }

    #[tokio::test]
    async fn test_failed_sign_in_leaves_database_usable() {
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let identity = Arc::new(LocalIdentityStore::new(db.clone(), i64::MAX));
        identity
            .sign_up("owner@example.com", "secret123", "Ana")
            .unwrap();
        let state = AppState::from_parts(db, identity, AppConfig::default());

        let result = state
            .with_identity(|identity| identity.sign_in("owner@example.com", "secret123"))
            .await;
        assert!(matches!(result, Err(Error::ValidationFailed(_))));

        assert_eq!(state.with_db(|db| db.schema_version()).await.unwrap(), 3);
        state.clear_auth_artifacts().await.unwrap();
    }
}
