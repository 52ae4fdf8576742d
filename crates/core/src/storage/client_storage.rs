//! Client-side key-value storage
//!
//! Two scopes: `Local` survives restarts, `Session` is wiped every time the
//! application starts. Used for cached authentication artifacts and the
//! tenant portal's lightweight session.

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{debug, instrument};

use super::parse::OptionalExt;
use crate::error::Result;

/// Key set by the tenant portal after a successful contact lookup
pub const TENANT_ID_KEY: &str = "tenant_id";
/// Identifier (email or phone) the tenant signed in with
pub const TENANT_IDENTIFIER_KEY: &str = "tenant_identifier";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageScope {
    Local,
    Session,
}

impl StorageScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Session => "session",
        }
    }
}

pub struct ClientStorageStore<'a> {
    conn: &'a Connection,
}

impl<'a> ClientStorageStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn set(&self, scope: StorageScope, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO client_storage (scope, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![scope.as_str(), key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get(&self, scope: StorageScope, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM client_storage WHERE scope = ?1 AND key = ?2",
                params![scope.as_str(), key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn remove(&self, scope: StorageScope, key: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM client_storage WHERE scope = ?1 AND key = ?2",
            params![scope.as_str(), key],
        )?;
        Ok(())
    }

    /// Remove every key in one scope
    #[instrument(skip(self))]
    pub fn clear(&self, scope: StorageScope) -> Result<u64> {
        let count = self.conn.execute(
            "DELETE FROM client_storage WHERE scope = ?1",
            params![scope.as_str()],
        )?;
        debug!(count, "Cleared client storage scope");
        Ok(count as u64)
    }

    /// Remove every key in both scopes
    pub fn clear_all(&self) -> Result<u64> {
        Ok(self.clear(StorageScope::Local)? + self.clear(StorageScope::Session)?)
    }
}
