//! Landlord account and session models

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A landlord account known to the identity store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landlord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Landlord {
    pub fn new(email: String, password_hash: String, full_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            full_name,
            created_at: Utc::now(),
            last_login: None,
        }
    }
}

/// The principal a session was issued to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

/// Authenticated landlord session
///
/// `expires_at` is unix seconds. A session without a `user` is treated as
/// absent by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: Uuid,
    pub user: Option<SessionUser>,
    pub expires_at: i64,
}

/// Unix seconds `duration_hours` from now, `None` when out of range
pub fn expiry_after(duration_hours: i64) -> Option<i64> {
    let duration = Duration::try_hours(duration_hours)?;
    Utc::now()
        .checked_add_signed(duration)
        .map(|at| at.timestamp())
}

impl Session {
    /// A fresh session lasting `duration_hours`, `None` when that overflows
    pub fn new(user: SessionUser, duration_hours: i64) -> Option<Self> {
        expiry_after(duration_hours).map(|expires_at| Self::expiring_at(user, expires_at))
    }

    pub fn expiring_at(user: SessionUser, expires_at: i64) -> Self {
        Self {
            access_token: Uuid::new_v4(),
            user: Some(user),
            expires_at,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_after_out_of_range() {
        let now = Utc::now().timestamp();
        let in_a_day = expiry_after(24).unwrap();
        assert!(in_a_day >= now + 24 * 3600);

        assert!(expiry_after(i64::MAX).is_none());
        assert!(expiry_after(1_000_000_000_000_000).is_none());

        let user = SessionUser {
            id: Uuid::new_v4(),
            email: "owner@example.com".to_string(),
        };
        assert!(Session::new(user.clone(), i64::MAX).is_none());
        assert!(Session::new(user, 1).is_some());
    }
}
