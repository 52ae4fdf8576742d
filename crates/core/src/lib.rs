//! UnitKo Core Library
//!
//! Models, the local tenant directory, identity sessions, and the
//! rental lifecycle workflows for the UnitKo platform.

pub mod config;
pub mod error;
pub mod identity;
pub mod invariants;
pub mod lifecycle;
pub mod limits;
pub mod models;
pub mod session;
pub mod storage;

pub use config::AppConfig;
pub use error::{Error, ErrorKind, Result};
pub use identity::{
    AuthEvent, AuthEventKind, AuthSubscription, IdentityStore, LocalIdentityStore,
    AUTH_TOKEN_KEY,
};
pub use lifecycle::{archive_and_reset, billing_totals, ArchiveError, ArchiveOutcome, BillingTotals};
pub use limits::{can_add_property, LimitDecision};
pub use models::*;
pub use session::{check_session, is_session_valid, validate_session, SessionStatus};
pub use storage::{
    Database, StorageScope, TenantDirectory, TENANT_IDENTIFIER_KEY, TENANT_ID_KEY,
};
