//! Session validation
//!
//! A pure decision over a session-or-absent value. Callers react to the
//! outcome (cleanup on `Expired`, redirect on `Absent`).

use chrono::{DateTime, Utc};

use crate::models::Session;

/// Outcome of inspecting a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Valid,
    Expired,
    Absent,
}

impl SessionStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, SessionStatus::Valid)
    }
}

/// Decide whether `session` is usable at `now`
///
/// Valid iff a session is present, carries a user, and
/// `expires_at * 1000 > now` in milliseconds. An expiry that cannot be
/// converted to milliseconds is reported as `Absent`.
pub fn validate_session(session: Option<&Session>, now: DateTime<Utc>) -> SessionStatus {
    let Some(session) = session else {
        return SessionStatus::Absent;
    };
    if session.user.is_none() {
        return SessionStatus::Absent;
    }
    let Some(expires_at_ms) = session.expires_at.checked_mul(1000) else {
        return SessionStatus::Absent;
    };

    if expires_at_ms > now.timestamp_millis() {
        SessionStatus::Valid
    } else {
        SessionStatus::Expired
    }
}

/// Validate against the wall clock
pub fn check_session(session: Option<&Session>) -> SessionStatus {
    validate_session(session, Utc::now())
}

pub fn is_session_valid(session: Option<&Session>) -> bool {
    check_session(session).is_valid()
}
