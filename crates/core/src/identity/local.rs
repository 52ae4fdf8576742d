//! SQLite-backed identity store
//!
//! Landlord accounts live in `landlords`, issued sessions in
//! `auth_sessions`. The current access token is cached in local client
//! storage under [`AUTH_TOKEN_KEY`] so a restart picks the session back up.

use std::sync::{Arc, Mutex, MutexGuard};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{AuthEvent, AuthSubscription, IdentityStore, AUTH_TOKEN_KEY};
use crate::error::{Error, Result};
use crate::models::{expiry_after, Landlord, Session, SessionUser, Subscription};
use crate::session::check_session;
use crate::storage::{Database, StorageScope};

/// Message returned for any email/password mismatch
pub const INVALID_CREDENTIALS: &str = "Invalid login credentials";

const MIN_PASSWORD_LEN: usize = 6;
const EVENT_CAPACITY: usize = 32;

pub struct LocalIdentityStore {
    db: Arc<Mutex<Database>>,
    events: broadcast::Sender<AuthEvent>,
    session_hours: i64,
}

impl LocalIdentityStore {
    pub fn new(db: Arc<Mutex<Database>>, session_hours: i64) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            db,
            events,
            session_hours,
        }
    }

    fn lock_db(&self) -> Result<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|_| Error::ExternalCallFailed("database lock poisoned".to_string()))
    }

    /// Expiry for a session issued now, checked before any row is touched
    fn session_expiry(&self) -> Result<i64> {
        expiry_after(self.session_hours).ok_or_else(|| {
            Error::ValidationFailed(format!(
                "Session length of {} hours is out of range",
                self.session_hours
            ))
        })
    }

    fn emit(&self, event: AuthEvent) {
        let kind = event.kind;
        if self.events.send(event).is_err() {
            debug!(?kind, "No auth subscribers");
        }
    }

    /// Register a new landlord with a free, active subscription
    #[instrument(skip(self, password, full_name))]
    pub fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<Landlord> {
        let email = email.trim();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(Error::ValidationFailed(
                "Please enter a valid email address".to_string(),
            ));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(Error::ValidationFailed(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if full_name.trim().is_empty() {
            return Err(Error::ValidationFailed("Full name is required".to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Authentication(format!("Failed to hash password: {}", e)))?
            .to_string();

        let db = self.lock_db()?;
        if db.landlords().find_by_email(email)?.is_some() {
            return Err(Error::Authentication("User already registered".to_string()));
        }

        let landlord = Landlord::new(
            email.to_string(),
            password_hash,
            full_name.trim().to_string(),
        );
        db.landlords().create(&landlord)?;
        db.profiles().create(&Subscription::free(landlord.id))?;

        info!(landlord_id = %landlord.id, "Landlord registered");
        Ok(landlord)
    }

    fn current_token(db: &Database) -> Result<Option<Uuid>> {
        let token = db.client_storage().get(StorageScope::Local, AUTH_TOKEN_KEY)?;
        Ok(token.and_then(|t| Uuid::parse_str(&t).ok()))
    }

    fn forget_token(db: &Database, token: Uuid) -> Result<()> {
        db.landlords().delete_session(token)?;
        db.client_storage().remove(StorageScope::Local, AUTH_TOKEN_KEY)?;
        Ok(())
    }

    /// Remove expired session rows
    pub fn cleanup_expired_sessions(&self) -> Result<u64> {
        let count = self.lock_db()?.landlords().cleanup_expired_sessions()?;
        if count > 0 {
            debug!(count, "Removed expired sessions");
        }
        Ok(count)
    }
}

impl IdentityStore for LocalIdentityStore {
    fn current_session(&self) -> Result<Option<Session>> {
        let db = self.lock_db()?;
        match Self::current_token(&db)? {
            Some(token) => db.landlords().find_session(token),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, password))]
    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let expires_at = self.session_expiry()?;
        let db = self.lock_db()?;
        let landlord = db
            .landlords()
            .find_by_email(email.trim())?
            .ok_or_else(|| Error::Authentication(INVALID_CREDENTIALS.to_string()))?;

        let parsed_hash = PasswordHash::new(&landlord.password_hash)
            .map_err(|_| Error::Authentication("Invalid stored password".to_string()))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            warn!(landlord_id = %landlord.id, "Password mismatch");
            return Err(Error::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        if let Some(previous) = Self::current_token(&db)? {
            db.landlords().delete_session(previous)?;
        }

        let session = Session::expiring_at(
            SessionUser {
                id: landlord.id,
                email: landlord.email.clone(),
            },
            expires_at,
        );
        db.landlords().create_session(landlord.id, &session)?;
        db.landlords().update_last_login(landlord.id)?;
        db.client_storage().set(
            StorageScope::Local,
            AUTH_TOKEN_KEY,
            &session.access_token.to_string(),
        )?;
        drop(db);

        info!(landlord_id = %landlord.id, "Landlord signed in");
        self.emit(AuthEvent::signed_in(session.clone()));
        Ok(session)
    }

    fn sign_out(&self) -> Result<()> {
        let db = self.lock_db()?;
        if let Some(token) = Self::current_token(&db)? {
            Self::forget_token(&db, token)?;
        }
        drop(db);

        info!("Landlord signed out");
        self.emit(AuthEvent::signed_out());
        Ok(())
    }

    #[instrument(skip(self))]
    fn refresh_session(&self) -> Result<Option<Session>> {
        let expires_at = self.session_expiry()?;
        let db = self.lock_db()?;
        let Some(token) = Self::current_token(&db)? else {
            drop(db);
            self.emit(AuthEvent::token_refreshed(None));
            return Ok(None);
        };

        let session = db.landlords().find_session(token)?;
        if !check_session(session.as_ref()).is_valid() {
            Self::forget_token(&db, token)?;
            drop(db);
            debug!("Session lapsed before refresh");
            self.emit(AuthEvent::token_refreshed(None));
            return Ok(None);
        }

        let Some(mut session) = session else {
            return Ok(None);
        };
        session.expires_at = expires_at;
        db.landlords().extend_session(token, session.expires_at)?;
        drop(db);

        self.emit(AuthEvent::token_refreshed(Some(session.clone())));
        Ok(Some(session))
    }

    fn subscribe(&self) -> AuthSubscription {
        AuthSubscription::new(self.events.subscribe())
    }
}
