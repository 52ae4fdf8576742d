//! SQLite storage layer for UnitKo
//!
//! `Database` is the local Tenant Directory: it implements every repository
//! trait in [`traits`] and hands out per-table stores.

mod archives;
mod billing;
mod client_storage;
mod landlords;
mod migrations;
mod parse;
mod profiles;
mod properties;
mod tenants;
mod traits;

use rusqlite::Connection;
use std::path::Path;
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    ArchivedTenant, BillingEntry, OccupancyStatus, PlanTier, Property, Subscription, Tenant,
};

pub use archives::ArchiveStore;
pub use billing::BillingStore;
pub use client_storage::{
    ClientStorageStore, StorageScope, TENANT_IDENTIFIER_KEY, TENANT_ID_KEY,
};
pub use landlords::LandlordStore;
pub use profiles::ProfileStore;
pub use properties::PropertyStore;
pub use tenants::TenantStore;
pub use traits::{
    ArchiveRepository, BillingRepository, PropertyRepository, SubscriptionRepository,
    TenantDirectory, TenantRepository,
};

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    ///
    /// Session-scoped client storage does not survive a reopen.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        db.client_storage().clear(StorageScope::Session)?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> Result<u32> {
        let version: Option<u32> =
            self.conn
                .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                    row.get(0)
                })?;
        Ok(version.unwrap_or(0))
    }

    pub fn landlords(&self) -> LandlordStore<'_> {
        LandlordStore::new(&self.conn)
    }

    pub fn profiles(&self) -> ProfileStore<'_> {
        ProfileStore::new(&self.conn)
    }

    pub fn properties(&self) -> PropertyStore<'_> {
        PropertyStore::new(&self.conn)
    }

    pub fn tenants(&self) -> TenantStore<'_> {
        TenantStore::new(&self.conn)
    }

    pub fn billing(&self) -> BillingStore<'_> {
        BillingStore::new(&self.conn)
    }

    pub fn archives(&self) -> ArchiveStore<'_> {
        ArchiveStore::new(&self.conn)
    }

    /// Key-value storage standing in for browser local/session storage
    pub fn client_storage(&self) -> ClientStorageStore<'_> {
        ClientStorageStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// This enables running the workflows through the directory interface

impl PropertyRepository for Database {
    fn create_property(&self, property: &Property) -> Result<()> {
        self.properties().create(property)
    }

    fn find_property_by_id(&self, id: Uuid) -> Result<Option<Property>> {
        self.properties().find_by_id(id)
    }

    fn list_properties_for_landlord(&self, landlord_id: Uuid) -> Result<Vec<Property>> {
        self.properties().list_for_landlord(landlord_id)
    }

    fn count_properties_for_landlord(&self, landlord_id: Uuid) -> Result<u32> {
        self.properties().count_for_landlord(landlord_id)
    }

    fn update_occupancy(&self, property_id: Uuid, status: OccupancyStatus) -> Result<()> {
        self.properties().update_occupancy(property_id, status)
    }
}

impl TenantRepository for Database {
    fn create_tenant(&self, tenant: &Tenant) -> Result<()> {
        self.tenants().create(tenant)
    }

    fn find_tenant_for_property(
        &self,
        tenant_id: Uuid,
        property_id: Uuid,
    ) -> Result<Option<Tenant>> {
        self.tenants().find_for_property(tenant_id, property_id)
    }

    fn find_active_tenant_for_property(&self, property_id: Uuid) -> Result<Option<Tenant>> {
        self.tenants().find_active_for_property(property_id)
    }

    fn find_active_tenant_by_contact(&self, identifier: &str) -> Result<Option<Tenant>> {
        self.tenants().find_active_by_contact(identifier)
    }

    fn find_tenant_by_id(&self, tenant_id: Uuid) -> Result<Option<Tenant>> {
        self.tenants().find_by_id(tenant_id)
    }

    fn delete_tenant(&self, tenant_id: Uuid) -> Result<()> {
        self.tenants().delete(tenant_id)
    }
}

impl BillingRepository for Database {
    fn create_billing_entry(&self, entry: &BillingEntry) -> Result<()> {
        self.billing().create(entry)
    }

    fn list_billing_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<BillingEntry>> {
        self.billing().list_for_tenant(tenant_id)
    }

    fn find_billing_entry(&self, entry_id: Uuid) -> Result<Option<BillingEntry>> {
        self.billing().find_by_id(entry_id)
    }

    fn update_billing_status(&self, entry_id: Uuid, status: &str) -> Result<()> {
        self.billing().update_status(entry_id, status)
    }

    fn delete_billing_for_tenant(&self, tenant_id: Uuid) -> Result<u64> {
        self.billing().delete_for_tenant(tenant_id)
    }
}

impl ArchiveRepository for Database {
    fn insert_archived_tenant(&self, archived: &ArchivedTenant) -> Result<()> {
        self.archives().insert(archived)
    }

    fn list_archived_for_property(&self, property_id: Uuid) -> Result<Vec<ArchivedTenant>> {
        self.archives().list_for_property(property_id)
    }
}

impl SubscriptionRepository for Database {
    fn create_subscription(&self, subscription: &Subscription) -> Result<()> {
        self.profiles().create(subscription)
    }

    fn find_subscription(&self, landlord_id: Uuid) -> Result<Option<Subscription>> {
        self.profiles().find(landlord_id)
    }

    fn update_plan(&self, landlord_id: Uuid, plan: PlanTier) -> Result<()> {
        self.profiles().update_plan(landlord_id, plan)
    }
}

/// Fixture builders shared by the storage and workflow tests
#[cfg(test)]
pub(crate) mod testing {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::Database;
    use crate::models::{Landlord, Property, Tenant};

    pub fn create_landlord(db: &Database) -> Uuid {
        let id = Uuid::new_v4();
        let landlord = Landlord {
            id,
            email: format!("landlord_{}@example.com", id),
            password_hash: "hash".to_string(),
            full_name: "Test Landlord".to_string(),
            created_at: chrono::Utc::now(),
            last_login: None,
        };
        db.landlords().create(&landlord).unwrap();
        id
    }

    pub fn create_property(db: &Database, landlord_id: Uuid, name: &str) -> Property {
        let property = Property::new(
            landlord_id,
            name.to_string(),
            "Apartment".to_string(),
            "Makati".to_string(),
            Decimal::from(15000),
        );
        db.properties().create(&property).unwrap();
        property
    }

    pub fn create_tenant(db: &Database, property: &Property) -> Tenant {
        let tenant = Tenant::new(
            property.id,
            "Juan Dela Cruz".to_string(),
            12,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            15,
        )
        .with_email("juan@example.com".to_string())
        .with_phone("09170000000".to_string());
        db.tenants().create(&tenant).unwrap();
        db.properties()
            .update_occupancy(property.id, crate::models::OccupancyStatus::Occupied)
            .unwrap();
        tenant
    }
}
