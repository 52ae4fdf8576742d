//! Database migration system
//!
//! Tracks schema versions and applies migrations in order.

use rusqlite::Connection;
use tracing::{debug, info, instrument};

use crate::error::Result;

/// A database migration
pub struct Migration {
    /// Version number (must be sequential starting from 1)
    pub version: u32,
    /// Description of what this migration does
    pub description: &'static str,
    /// SQL to run for this migration
    pub sql: &'static str,
}

/// All migrations in order
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema",
        sql: r#"
            -- Landlord accounts
            CREATE TABLE IF NOT EXISTS landlords (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                full_name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_login TEXT
            );

            -- Issued landlord sessions (expires_at is unix seconds)
            CREATE TABLE IF NOT EXISTS auth_sessions (
                access_token TEXT PRIMARY KEY,
                landlord_id TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (landlord_id) REFERENCES landlords(id) ON DELETE CASCADE
            );

            -- Landlord profile carrying subscription state
            CREATE TABLE IF NOT EXISTS profiles (
                landlord_id TEXT PRIMARY KEY,
                plan TEXT NOT NULL DEFAULT 'free',
                status TEXT NOT NULL DEFAULT 'active',
                start_date TEXT NOT NULL,
                end_date TEXT,
                last_payment_date TEXT,
                next_billing_date TEXT,
                FOREIGN KEY (landlord_id) REFERENCES landlords(id) ON DELETE CASCADE
            );

            -- Rental units
            CREATE TABLE IF NOT EXISTS properties (
                id TEXT PRIMARY KEY,
                landlord_id TEXT NOT NULL,
                name TEXT NOT NULL,
                property_type TEXT NOT NULL,
                location TEXT NOT NULL,
                rent_amount TEXT NOT NULL,
                occupancy_status TEXT NOT NULL DEFAULT 'vacant',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (landlord_id) REFERENCES landlords(id) ON DELETE CASCADE
            );

            -- Active tenants
            CREATE TABLE IF NOT EXISTS tenants (
                id TEXT PRIMARY KEY,
                property_id TEXT NOT NULL,
                name TEXT NOT NULL,
                email TEXT,
                phone TEXT,
                contract_months INTEGER NOT NULL,
                rent_start_date TEXT NOT NULL,
                due_day INTEGER NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                FOREIGN KEY (property_id) REFERENCES properties(id)
            );

            -- Billing cycles for active tenants
            CREATE TABLE IF NOT EXISTS billing_entries (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                property_id TEXT NOT NULL,
                due_date TEXT NOT NULL,
                rent_due TEXT NOT NULL,
                charges_json TEXT NOT NULL DEFAULT '[]',
                other_charges TEXT NOT NULL,
                gross_due TEXT NOT NULL,
                status TEXT NOT NULL,
                billing_period INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (tenant_id) REFERENCES tenants(id),
                FOREIGN KEY (property_id) REFERENCES properties(id),
                UNIQUE(tenant_id, billing_period)
            );

            -- Write-once history snapshots; no foreign keys so they outlive
            -- the rows they were copied from
            CREATE TABLE IF NOT EXISTS archived_tenants (
                id TEXT PRIMARY KEY,
                property_id TEXT NOT NULL,
                tenant_id TEXT NOT NULL,
                landlord_id TEXT NOT NULL,
                property_name TEXT NOT NULL,
                property_type TEXT NOT NULL,
                property_location TEXT NOT NULL,
                rent_amount TEXT NOT NULL,
                tenant_name TEXT NOT NULL,
                tenant_email TEXT,
                tenant_phone TEXT,
                contract_months INTEGER NOT NULL,
                rent_start_date TEXT NOT NULL,
                rent_end_date TEXT NOT NULL,
                due_day INTEGER NOT NULL,
                total_due TEXT NOT NULL,
                total_paid TEXT NOT NULL,
                billing_snapshot TEXT NOT NULL,
                archive_reason TEXT NOT NULL,
                archived_at TEXT NOT NULL
            );
        "#,
    },
    Migration {
        version: 2,
        description: "Add indexes for query performance",
        sql: r#"
            CREATE INDEX IF NOT EXISTS idx_auth_sessions_landlord ON auth_sessions(landlord_id);
            CREATE INDEX IF NOT EXISTS idx_auth_sessions_expires ON auth_sessions(expires_at);

            CREATE INDEX IF NOT EXISTS idx_properties_landlord ON properties(landlord_id);

            CREATE INDEX IF NOT EXISTS idx_tenants_property ON tenants(property_id);
            CREATE INDEX IF NOT EXISTS idx_tenants_email ON tenants(email);
            CREATE INDEX IF NOT EXISTS idx_tenants_phone ON tenants(phone);

            CREATE INDEX IF NOT EXISTS idx_billing_tenant_period ON billing_entries(tenant_id, billing_period);

            CREATE INDEX IF NOT EXISTS idx_archived_property ON archived_tenants(property_id);
        "#,
    },
    Migration {
        version: 3,
        description: "Add client key-value storage",
        sql: r#"
            -- Scope is 'local' (kept across runs) or 'session' (cleared at startup)
            CREATE TABLE IF NOT EXISTS client_storage (
                scope TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (scope, key)
            );
        "#,
    },
];

/// Initialize the migrations table
fn init_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Get the current schema version
fn get_current_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| row.get(0))?;
    Ok(version.unwrap_or(0))
}

/// Record that a migration was applied
fn record_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.version,
            migration.description,
            chrono::Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Run all pending migrations
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    init_migrations_table(conn)?;

    let current_version = get_current_version(conn)?;
    debug!(current_version, "Checking for pending migrations");

    for migration in MIGRATIONS
        .iter()
        .filter(|m| m.version > current_version)
    {
        info!(
            version = migration.version,
            description = migration.description,
            "Applying migration"
        );
        conn.execute_batch(migration.sql)?;
        record_migration(conn, migration)?;
    }

    let new_version = get_current_version(conn)?;
    if new_version > current_version {
        info!(
            from = current_version,
            to = new_version,
            "Database schema updated"
        );
    }

    Ok(())
}
