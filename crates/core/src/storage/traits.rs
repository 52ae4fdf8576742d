//! Tenant Directory repository traits
//!
//! These traits define the directory interface the workflows run against,
//! allowing for different implementations (SQLite, test doubles, a hosted
//! backend).

use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    ArchivedTenant, BillingEntry, OccupancyStatus, PlanTier, Property, Subscription, Tenant,
};

/// Property repository operations
pub trait PropertyRepository {
    /// Create a new property
    fn create_property(&self, property: &Property) -> Result<()>;

    /// Find property by ID
    fn find_property_by_id(&self, id: Uuid) -> Result<Option<Property>>;

    /// List all properties owned by a landlord
    fn list_properties_for_landlord(&self, landlord_id: Uuid) -> Result<Vec<Property>>;

    /// Count properties owned by a landlord
    fn count_properties_for_landlord(&self, landlord_id: Uuid) -> Result<u32>;

    /// Set the occupancy status of a property
    fn update_occupancy(&self, property_id: Uuid, status: OccupancyStatus) -> Result<()>;
}

/// Tenant repository operations
pub trait TenantRepository {
    /// Create a new tenant
    fn create_tenant(&self, tenant: &Tenant) -> Result<()>;

    /// Find tenant by ID, only if it belongs to the given property
    fn find_tenant_for_property(&self, tenant_id: Uuid, property_id: Uuid)
        -> Result<Option<Tenant>>;

    /// Find the active tenant of a property
    fn find_active_tenant_for_property(&self, property_id: Uuid) -> Result<Option<Tenant>>;

    /// Find an active tenant by email or phone
    fn find_active_tenant_by_contact(&self, identifier: &str) -> Result<Option<Tenant>>;

    /// Find tenant by ID
    fn find_tenant_by_id(&self, tenant_id: Uuid) -> Result<Option<Tenant>>;

    /// Delete a tenant record
    fn delete_tenant(&self, tenant_id: Uuid) -> Result<()>;
}

/// Billing repository operations
pub trait BillingRepository {
    /// Create a billing entry
    fn create_billing_entry(&self, entry: &BillingEntry) -> Result<()>;

    /// List billing entries for a tenant, ordered by billing period ascending
    fn list_billing_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<BillingEntry>>;

    /// Find a billing entry by ID
    fn find_billing_entry(&self, entry_id: Uuid) -> Result<Option<BillingEntry>>;

    /// Update the status text of a billing entry
    fn update_billing_status(&self, entry_id: Uuid, status: &str) -> Result<()>;

    /// Delete all billing entries for a tenant, returning how many were removed
    fn delete_billing_for_tenant(&self, tenant_id: Uuid) -> Result<u64>;
}

/// Archive repository operations
pub trait ArchiveRepository {
    /// Insert a write-once archive snapshot
    fn insert_archived_tenant(&self, archived: &ArchivedTenant) -> Result<()>;

    /// List archive snapshots for a property, newest first
    fn list_archived_for_property(&self, property_id: Uuid) -> Result<Vec<ArchivedTenant>>;
}

/// Subscription repository operations
pub trait SubscriptionRepository {
    /// Create the subscription row on a landlord's profile
    fn create_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Get the subscription for a landlord
    fn find_subscription(&self, landlord_id: Uuid) -> Result<Option<Subscription>>;

    /// Move a landlord to a new plan tier
    fn update_plan(&self, landlord_id: Uuid, plan: PlanTier) -> Result<()>;
}

/// Combined Tenant Directory interface
///
/// Provides access to all repository operations.
/// Implementations may be backed by SQLite, mocks, or network.
pub trait TenantDirectory:
    PropertyRepository
    + TenantRepository
    + BillingRepository
    + ArchiveRepository
    + SubscriptionRepository
{
}

// Blanket implementation: any type implementing all traits implements TenantDirectory
impl<T> TenantDirectory for T where
    T: PropertyRepository
        + TenantRepository
        + BillingRepository
        + ArchiveRepository
        + SubscriptionRepository
{
}
