//! Landlord account and session storage operations

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_datetime_opt, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::{Landlord, Session, SessionUser};

pub struct LandlordStore<'a> {
    conn: &'a Connection,
}

fn row_to_landlord(row: &Row<'_>) -> rusqlite::Result<Landlord> {
    Ok(Landlord {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        full_name: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?)?,
        last_login: parse_datetime_opt(row.get::<_, Option<String>>(5)?)?,
    })
}

impl<'a> LandlordStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new landlord account
    #[instrument(skip(self, landlord), fields(email = %landlord.email))]
    pub fn create(&self, landlord: &Landlord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO landlords (id, email, password_hash, full_name, created_at, last_login)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                landlord.id.to_string(),
                landlord.email,
                landlord.password_hash,
                landlord.full_name,
                landlord.created_at.to_rfc3339(),
                landlord.last_login.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Find landlord by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Landlord>> {
        let landlord = self
            .conn
            .query_row(
                "SELECT id, email, password_hash, full_name, created_at, last_login
                 FROM landlords WHERE id = ?1",
                params![id.to_string()],
                row_to_landlord,
            )
            .optional()?;
        Ok(landlord)
    }

    /// Find landlord by email (case-insensitive)
    #[instrument(skip(self))]
    pub fn find_by_email(&self, email: &str) -> Result<Option<Landlord>> {
        let landlord = self
            .conn
            .query_row(
                "SELECT id, email, password_hash, full_name, created_at, last_login
                 FROM landlords WHERE email = ?1 COLLATE NOCASE",
                params![email],
                row_to_landlord,
            )
            .optional()?;
        Ok(landlord)
    }

    pub fn update_last_login(&self, landlord_id: Uuid) -> Result<()> {
        self.conn.execute(
            "UPDATE landlords SET last_login = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), landlord_id.to_string()],
        )?;
        Ok(())
    }

    /// Persist an issued session
    #[instrument(skip(self, session), fields(landlord_id = ?session.user_id()))]
    pub fn create_session(&self, landlord_id: Uuid, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT INTO auth_sessions (access_token, landlord_id, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                session.access_token.to_string(),
                landlord_id.to_string(),
                session.expires_at,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Load a session by token, expired or not
    ///
    /// Expiry is judged by the session validator, not here.
    #[instrument(skip(self))]
    pub fn find_session(&self, access_token: Uuid) -> Result<Option<Session>> {
        let session = self
            .conn
            .query_row(
                "SELECT s.access_token, s.expires_at, l.id, l.email
                 FROM auth_sessions s
                 LEFT JOIN landlords l ON l.id = s.landlord_id
                 WHERE s.access_token = ?1",
                params![access_token.to_string()],
                |row| {
                    let user = match row.get::<_, Option<String>>(2)? {
                        Some(id) => Some(SessionUser {
                            id: parse_uuid(&id)?,
                            email: row.get(3)?,
                        }),
                        None => None,
                    };
                    Ok(Session {
                        access_token: parse_uuid(&row.get::<_, String>(0)?)?,
                        user,
                        expires_at: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    /// Move a session's expiry, returning whether the row existed
    pub fn extend_session(&self, access_token: Uuid, expires_at: i64) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE auth_sessions SET expires_at = ?1 WHERE access_token = ?2",
            params![expires_at, access_token.to_string()],
        )?;
        Ok(updated > 0)
    }

    pub fn delete_session(&self, access_token: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM auth_sessions WHERE access_token = ?1",
            params![access_token.to_string()],
        )?;
        Ok(())
    }

    /// Clean up expired sessions
    pub fn cleanup_expired_sessions(&self) -> Result<u64> {
        let count = self.conn.execute(
            "DELETE FROM auth_sessions WHERE expires_at <= ?1",
            params![Utc::now().timestamp()],
        )?;
        Ok(count as u64)
    }
}
