//! Tenant lifecycle: archive-and-reset
//!
//! Moves an active tenant and their billing history into a write-once
//! archive snapshot, then frees the property for the next occupancy.
//!
//! The steps run strictly in order and are not wrapped in a transaction.
//! A failure after the snapshot is written leaves the directory partially
//! reset; nothing is rolled back or retried.

use chrono::{Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::error::ErrorKind;
use crate::invariants::{assert_archive_invariants, assert_id_valid};
use crate::models::{ArchivedTenant, BillingEntry, OccupancyStatus};
use crate::storage::TenantDirectory;

/// Why an archive-and-reset did not complete
///
/// The `Display` text is the reason string shown to the user.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Archive remarks are required")]
    MissingRemarks,

    #[error("Property not found")]
    PropertyNotFound,

    #[error("Tenant not found")]
    TenantNotFound,

    #[error("Failed to load billing entries: {0}")]
    BillingFetchFailed(String),

    #[error("Failed to compute rent end date")]
    InvalidContractTerm,

    #[error("Failed to archive tenant: {0}")]
    ArchiveWriteFailed(String),

    #[error("Tenant archived but billing entries could not be deleted: {0}")]
    BillingDeleteFailed(String),

    #[error("Tenant archived but tenant record could not be deleted: {0}")]
    TenantDeleteFailed(String),

    #[error("Tenant archived but property could not be marked vacant: {0}")]
    PropertyUpdateFailed(String),
}

impl ArchiveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRemarks | Self::InvalidContractTerm => ErrorKind::ValidationFailed,
            Self::PropertyNotFound | Self::TenantNotFound => ErrorKind::NotFound,
            Self::BillingFetchFailed(_) | Self::ArchiveWriteFailed(_) => {
                ErrorKind::ExternalCallFailed
            }
            Self::BillingDeleteFailed(_)
            | Self::TenantDeleteFailed(_)
            | Self::PropertyUpdateFailed(_) => ErrorKind::InconsistentState,
        }
    }
}

/// `{success, error}` value handed to UI-facing code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl From<&Result<ArchivedTenant, ArchiveError>> for ArchiveOutcome {
    fn from(result: &Result<ArchivedTenant, ArchiveError>) -> Self {
        match result {
            Ok(_) => Self {
                success: true,
                error: None,
            },
            Err(e) => Self {
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Billing aggregates recorded on an archive snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BillingTotals {
    pub total_due: Decimal,
    pub total_paid: Decimal,
}

impl BillingTotals {
    pub fn outstanding(&self) -> Decimal {
        self.total_due.saturating_sub(self.total_paid)
    }
}

/// Sum gross due over all entries, and over entries whose status counts as paid
///
/// Sums saturate at [`Decimal::MAX`].
pub fn billing_totals(entries: &[BillingEntry]) -> BillingTotals {
    entries
        .iter()
        .fold(BillingTotals::default(), |mut totals, entry| {
            totals.total_due = totals.total_due.saturating_add(entry.gross_due);
            if entry.counts_as_paid() {
                totals.total_paid = totals.total_paid.saturating_add(entry.gross_due);
            }
            totals
        })
}

/// Rent start plus the contract length in calendar months
///
/// Start days past the end of the target month clamp to its last day
/// (Jan 31 + 1 month = Feb 29 in a leap year).
pub fn rent_end_date(rent_start_date: NaiveDate, contract_months: u32) -> Option<NaiveDate> {
    rent_start_date.checked_add_months(Months::new(contract_months))
}

/// Archive a tenant and reset their property to vacant
#[instrument(skip(directory, remarks))]
pub fn archive_and_reset<D>(
    directory: &D,
    property_id: Uuid,
    tenant_id: Uuid,
    remarks: &str,
) -> Result<ArchivedTenant, ArchiveError>
where
    D: TenantDirectory + ?Sized,
{
    let remarks = remarks.trim();
    if remarks.is_empty() {
        return Err(ArchiveError::MissingRemarks);
    }
    assert_id_valid(property_id, "archive property");
    assert_id_valid(tenant_id, "archive tenant");

    let property = directory
        .find_property_by_id(property_id)
        .map_err(|e| {
            error!(error = %e, "Property lookup failed");
            ArchiveError::PropertyNotFound
        })?
        .ok_or(ArchiveError::PropertyNotFound)?;

    let tenant = directory
        .find_tenant_for_property(tenant_id, property_id)
        .map_err(|e| {
            error!(error = %e, "Tenant lookup failed");
            ArchiveError::TenantNotFound
        })?
        .ok_or(ArchiveError::TenantNotFound)?;

    let entries = directory
        .list_billing_for_tenant(tenant_id)
        .map_err(|e| ArchiveError::BillingFetchFailed(e.to_string()))?;
    debug!(entries = entries.len(), "Loaded billing entries");

    let totals = billing_totals(&entries);
    let end_date = rent_end_date(tenant.rent_start_date, tenant.contract_months)
        .ok_or(ArchiveError::InvalidContractTerm)?;
    let billing_snapshot = serde_json::to_string(&entries)
        .map_err(|e| ArchiveError::ArchiveWriteFailed(e.to_string()))?;

    let archived = ArchivedTenant {
        id: Uuid::new_v4(),
        property_id: property.id,
        tenant_id: tenant.id,
        landlord_id: property.landlord_id,
        property_name: property.name,
        property_type: property.property_type,
        property_location: property.location,
        rent_amount: property.rent_amount,
        tenant_name: tenant.name,
        tenant_email: tenant.email,
        tenant_phone: tenant.phone,
        contract_months: tenant.contract_months,
        rent_start_date: tenant.rent_start_date,
        rent_end_date: end_date,
        due_day: tenant.due_day,
        total_due: totals.total_due,
        total_paid: totals.total_paid,
        billing_snapshot,
        archive_reason: remarks.to_string(),
        archived_at: Utc::now(),
    };

    assert_archive_invariants(&archived);
    directory
        .insert_archived_tenant(&archived)
        .map_err(|e| ArchiveError::ArchiveWriteFailed(e.to_string()))?;
    debug!(archive_id = %archived.id, "Archive snapshot written");

    // Past this point every failure leaves the archive row behind
    let removed = directory
        .delete_billing_for_tenant(tenant_id)
        .map_err(|e| {
            error!(error = %e, archive_id = %archived.id, "Billing delete failed after archive");
            ArchiveError::BillingDeleteFailed(e.to_string())
        })?;
    debug!(removed, "Billing entries deleted");

    directory.delete_tenant(tenant_id).map_err(|e| {
        error!(error = %e, archive_id = %archived.id, "Tenant delete failed after archive");
        ArchiveError::TenantDeleteFailed(e.to_string())
    })?;

    directory
        .update_occupancy(property_id, OccupancyStatus::Vacant)
        .map_err(|e| {
            error!(error = %e, archive_id = %archived.id, "Property reset failed after archive");
            ArchiveError::PropertyUpdateFailed(e.to_string())
        })?;

    info!(
        archive_id = %archived.id,
        total_due = %archived.total_due,
        total_paid = %archived.total_paid,
        "Tenant archived and property reset"
    );
    Ok(archived)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::{Error, Result};
    use crate::models::{BillingEntry, ChargeItem, PlanTier, Property, Subscription, Tenant};
    use crate::storage::testing::{create_landlord, create_property, create_tenant};
    use crate::storage::{
        ArchiveRepository, BillingRepository, Database, PropertyRepository,
        SubscriptionRepository, TenantRepository,
    };

    fn entry(tenant: &Tenant, period: u32, gross: i64, status: &str) -> BillingEntry {
        BillingEntry::new(
            tenant.id,
            tenant.property_id,
            period,
            NaiveDate::from_ymd_opt(2024, period, 15).unwrap(),
            Decimal::from(gross),
            Vec::new(),
        )
        .with_status(status)
    }

    #[test]
    fn test_billing_totals() {
        let tenant = Tenant::new(
            Uuid::new_v4(),
            "T".into(),
            12,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            15,
        );
        let entries = vec![
            entry(&tenant, 1, 1000, "Paid"),
            entry(&tenant, 2, 500, "Pending"),
            entry(&tenant, 3, 300, "Good Standing"),
        ];
        let totals = billing_totals(&entries);
        assert_eq!(totals.total_due, Decimal::from(1800));
        assert_eq!(totals.total_paid, Decimal::from(1300));
        assert_eq!(totals.outstanding(), Decimal::from(500));
    }

    #[test]
    fn test_billing_totals_saturate() {
        let tenant = Tenant::new(
            Uuid::new_v4(),
            "T".into(),
            12,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            15,
        );
        let huge = |period| {
            BillingEntry::new(
                tenant.id,
                tenant.property_id,
                period,
                NaiveDate::from_ymd_opt(2024, period, 15).unwrap(),
                Decimal::MAX,
                vec![ChargeItem {
                    name: "Water".into(),
                    amount: Decimal::MAX,
                }],
            )
            .with_status("Paid")
        };
        let entries = vec![huge(1), huge(2)];
        assert_eq!(entries[0].gross_due, Decimal::MAX);

        let totals = billing_totals(&entries);
        assert_eq!(totals.total_due, Decimal::MAX);
        assert_eq!(totals.total_paid, Decimal::MAX);
        assert_eq!(totals.outstanding(), Decimal::ZERO);
    }

    #[test]
    fn test_billing_totals_empty() {
        assert_eq!(billing_totals(&[]), BillingTotals::default());
    }

    #[test]
    fn test_rent_end_date() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(
            rent_end_date(start, 12),
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );

        let end_of_month = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            rent_end_date(end_of_month, 1),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
    }

    #[test]
    fn test_archive_and_reset_end_to_end() {
        let db = Database::open_in_memory().unwrap();
        let landlord_id = create_landlord(&db);
        let property = create_property(&db, landlord_id, "P1");
        let tenant = create_tenant(&db, &property);
        db.create_billing_entry(&entry(&tenant, 1, 15000, "Paid")).unwrap();
        db.create_billing_entry(&entry(&tenant, 2, 15000, "Pending")).unwrap();

        let archived =
            archive_and_reset(&db, property.id, tenant.id, "Lease completed on time").unwrap();

        assert_eq!(archived.property_id, property.id);
        assert_eq!(archived.tenant_id, tenant.id);
        assert_eq!(archived.tenant_name, "Juan Dela Cruz");
        assert_eq!(archived.total_due, Decimal::from(30000));
        assert_eq!(archived.total_paid, Decimal::from(15000));
        assert_eq!(archived.rent_end_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(archived.archive_reason, "Lease completed on time");
        assert_eq!(archived.billing_entries().unwrap().len(), 2);

        let history = db.list_archived_for_property(property.id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, archived.id);

        assert!(db.list_billing_for_tenant(tenant.id).unwrap().is_empty());
        assert!(db.find_tenant_by_id(tenant.id).unwrap().is_none());
        let property = db.find_property_by_id(property.id).unwrap().unwrap();
        assert_eq!(property.occupancy_status, OccupancyStatus::Vacant);
    }

    #[test]
    fn test_unknown_tenant_changes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let landlord_id = create_landlord(&db);
        let property = create_property(&db, landlord_id, "P1");
        let tenant = create_tenant(&db, &property);
        db.create_billing_entry(&entry(&tenant, 1, 15000, "Paid")).unwrap();

        let result = archive_and_reset(&db, property.id, Uuid::new_v4(), "Lease completed");
        let outcome = ArchiveOutcome::from(&result);
        assert_eq!(
            outcome,
            ArchiveOutcome {
                success: false,
                error: Some("Tenant not found".to_string()),
            }
        );

        assert!(db.list_archived_for_property(property.id).unwrap().is_empty());
        assert_eq!(db.list_billing_for_tenant(tenant.id).unwrap().len(), 1);
        assert!(db.find_tenant_by_id(tenant.id).unwrap().is_some());
        assert!(db.find_property_by_id(property.id).unwrap().unwrap().is_occupied());
    }

    #[test]
    fn test_tenant_of_other_property_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let landlord_id = create_landlord(&db);
        let property = create_property(&db, landlord_id, "P1");
        let other = create_property(&db, landlord_id, "P2");
        let tenant = create_tenant(&db, &property);

        let result = archive_and_reset(&db, other.id, tenant.id, "Wrong unit selected");
        assert!(matches!(result, Err(ArchiveError::TenantNotFound)));
    }

    #[test]
    fn test_unknown_property() {
        let db = Database::open_in_memory().unwrap();
        let result = archive_and_reset(&db, Uuid::new_v4(), Uuid::new_v4(), "Lease completed");
        let err = result.unwrap_err();
        assert!(matches!(err, ArchiveError::PropertyNotFound));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_blank_remarks_rejected() {
        let db = Database::open_in_memory().unwrap();
        let landlord_id = create_landlord(&db);
        let property = create_property(&db, landlord_id, "P1");
        let tenant = create_tenant(&db, &property);

        let result = archive_and_reset(&db, property.id, tenant.id, "   ");
        assert!(matches!(result, Err(ArchiveError::MissingRemarks)));
        assert!(db.find_tenant_by_id(tenant.id).unwrap().is_some());
    }

    /// Wraps a real directory and fails one chosen step
    struct FailingDirectory {
        inner: Database,
        fail_archive_insert: bool,
        fail_billing_delete: bool,
        fail_tenant_delete: bool,
        fail_occupancy_update: bool,
        deletes: Cell<u32>,
    }

    impl FailingDirectory {
        fn new(inner: Database) -> Self {
            Self {
                inner,
                fail_archive_insert: false,
                fail_billing_delete: false,
                fail_tenant_delete: false,
                fail_occupancy_update: false,
                deletes: Cell::new(0),
            }
        }
    }

    impl PropertyRepository for FailingDirectory {
        fn create_property(&self, property: &Property) -> Result<()> {
            self.inner.create_property(property)
        }
        fn find_property_by_id(&self, id: Uuid) -> Result<Option<Property>> {
            self.inner.find_property_by_id(id)
        }
        fn list_properties_for_landlord(&self, landlord_id: Uuid) -> Result<Vec<Property>> {
            self.inner.list_properties_for_landlord(landlord_id)
        }
        fn count_properties_for_landlord(&self, landlord_id: Uuid) -> Result<u32> {
            self.inner.count_properties_for_landlord(landlord_id)
        }
        fn update_occupancy(&self, property_id: Uuid, status: OccupancyStatus) -> Result<()> {
            if self.fail_occupancy_update {
                return Err(Error::ExternalCallFailed("property table locked".into()));
            }
            self.inner.update_occupancy(property_id, status)
        }
    }

    impl TenantRepository for FailingDirectory {
        fn create_tenant(&self, tenant: &Tenant) -> Result<()> {
            self.inner.create_tenant(tenant)
        }
        fn find_tenant_for_property(&self, t: Uuid, p: Uuid) -> Result<Option<Tenant>> {
            self.inner.find_tenant_for_property(t, p)
        }
        fn find_active_tenant_for_property(&self, p: Uuid) -> Result<Option<Tenant>> {
            self.inner.find_active_tenant_for_property(p)
        }
        fn find_active_tenant_by_contact(&self, identifier: &str) -> Result<Option<Tenant>> {
            self.inner.find_active_tenant_by_contact(identifier)
        }
        fn find_tenant_by_id(&self, tenant_id: Uuid) -> Result<Option<Tenant>> {
            self.inner.find_tenant_by_id(tenant_id)
        }
        fn delete_tenant(&self, tenant_id: Uuid) -> Result<()> {
            self.deletes.set(self.deletes.get() + 1);
            if self.fail_tenant_delete {
                return Err(Error::ExternalCallFailed("tenant service unavailable".into()));
            }
            self.inner.delete_tenant(tenant_id)
        }
    }

    impl BillingRepository for FailingDirectory {
        fn create_billing_entry(&self, entry: &BillingEntry) -> Result<()> {
            self.inner.create_billing_entry(entry)
        }
        fn list_billing_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<BillingEntry>> {
            self.inner.list_billing_for_tenant(tenant_id)
        }
        fn find_billing_entry(&self, entry_id: Uuid) -> Result<Option<BillingEntry>> {
            self.inner.find_billing_entry(entry_id)
        }
        fn update_billing_status(&self, entry_id: Uuid, status: &str) -> Result<()> {
            self.inner.update_billing_status(entry_id, status)
        }
        fn delete_billing_for_tenant(&self, tenant_id: Uuid) -> Result<u64> {
            self.deletes.set(self.deletes.get() + 1);
            if self.fail_billing_delete {
                return Err(Error::ExternalCallFailed("billing service unavailable".into()));
            }
            self.inner.delete_billing_for_tenant(tenant_id)
        }
    }

    impl ArchiveRepository for FailingDirectory {
        fn insert_archived_tenant(&self, archived: &ArchivedTenant) -> Result<()> {
            if self.fail_archive_insert {
                return Err(Error::ExternalCallFailed("archive table unavailable".into()));
            }
            self.inner.insert_archived_tenant(archived)
        }
        fn list_archived_for_property(&self, property_id: Uuid) -> Result<Vec<ArchivedTenant>> {
            self.inner.list_archived_for_property(property_id)
        }
    }

    impl SubscriptionRepository for FailingDirectory {
        fn create_subscription(&self, subscription: &Subscription) -> Result<()> {
            self.inner.create_subscription(subscription)
        }
        fn find_subscription(&self, landlord_id: Uuid) -> Result<Option<Subscription>> {
            self.inner.find_subscription(landlord_id)
        }
        fn update_plan(&self, landlord_id: Uuid, plan: PlanTier) -> Result<()> {
            self.inner.update_plan(landlord_id, plan)
        }
    }

    #[test]
    fn test_archive_write_failure_stops_before_deletes() {
        let db = Database::open_in_memory().unwrap();
        let landlord_id = create_landlord(&db);
        let property = create_property(&db, landlord_id, "P1");
        let tenant = create_tenant(&db, &property);

        let mut directory = FailingDirectory::new(db);
        directory.fail_archive_insert = true;

        let result = archive_and_reset(&directory, property.id, tenant.id, "Lease completed");
        assert!(matches!(result, Err(ArchiveError::ArchiveWriteFailed(_))));
        assert_eq!(directory.deletes.get(), 0);
        assert!(directory.inner.find_tenant_by_id(tenant.id).unwrap().is_some());
    }

    #[test]
    fn test_billing_delete_failure_leaves_archive_row() {
        let db = Database::open_in_memory().unwrap();
        let landlord_id = create_landlord(&db);
        let property = create_property(&db, landlord_id, "P1");
        let tenant = create_tenant(&db, &property);

        let mut directory = FailingDirectory::new(db);
        directory.fail_billing_delete = true;

        let err = archive_and_reset(&directory, property.id, tenant.id, "Lease completed")
            .unwrap_err();
        assert!(matches!(err, ArchiveError::BillingDeleteFailed(_)));
        assert_eq!(err.kind(), ErrorKind::InconsistentState);

        // No rollback: snapshot exists, tenant and occupancy untouched
        let inner = &directory.inner;
        assert_eq!(inner.list_archived_for_property(property.id).unwrap().len(), 1);
        assert!(inner.find_tenant_by_id(tenant.id).unwrap().is_some());
        assert!(inner.find_property_by_id(property.id).unwrap().unwrap().is_occupied());
    }

    #[test]
    fn test_tenant_delete_failure_leaves_property_occupied() {
        let db = Database::open_in_memory().unwrap();
        let landlord_id = create_landlord(&db);
        let property = create_property(&db, landlord_id, "P1");
        let tenant = create_tenant(&db, &property);
        db.create_billing_entry(&entry(&tenant, 1, 15000, "Paid")).unwrap();

        let mut directory = FailingDirectory::new(db);
        directory.fail_tenant_delete = true;

        let err = archive_and_reset(&directory, property.id, tenant.id, "Lease completed")
            .unwrap_err();
        assert!(matches!(err, ArchiveError::TenantDeleteFailed(_)));
        assert_eq!(err.kind(), ErrorKind::InconsistentState);
        assert_eq!(directory.deletes.get(), 2);

        let inner = &directory.inner;
        let archived = inner.list_archived_for_property(property.id).unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].total_paid, Decimal::from(15000));
        assert!(inner.list_billing_for_tenant(tenant.id).unwrap().is_empty());
        assert!(inner.find_tenant_by_id(tenant.id).unwrap().is_some());
        assert!(inner.find_property_by_id(property.id).unwrap().unwrap().is_occupied());
    }

    #[test]
    fn test_occupancy_update_failure_after_tenant_removed() {
        let db = Database::open_in_memory().unwrap();
        let landlord_id = create_landlord(&db);
        let property = create_property(&db, landlord_id, "P1");
        let tenant = create_tenant(&db, &property);

        let mut directory = FailingDirectory::new(db);
        directory.fail_occupancy_update = true;

        let err = archive_and_reset(&directory, property.id, tenant.id, "Lease completed")
            .unwrap_err();
        assert!(matches!(err, ArchiveError::PropertyUpdateFailed(_)));
        assert_eq!(err.kind(), ErrorKind::InconsistentState);
        let result: std::result::Result<ArchivedTenant, ArchiveError> = Err(err);
        let outcome = ArchiveOutcome::from(&result);
        assert!(!outcome.success);
        assert!(outcome
            .error
            .unwrap()
            .starts_with("Tenant archived but property could not be marked vacant"));

        let inner = &directory.inner;
        assert_eq!(inner.list_archived_for_property(property.id).unwrap().len(), 1);
        assert!(inner.find_tenant_by_id(tenant.id).unwrap().is_none());
        assert!(inner.find_property_by_id(property.id).unwrap().unwrap().is_occupied());
    }

    #[test]
    fn test_unrepresentable_contract_term_writes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let landlord_id = create_landlord(&db);
        let property = create_property(&db, landlord_id, "P1");
        let tenant = Tenant::new(
            property.id,
            "Maria Clara".to_string(),
            u32::MAX,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            15,
        );
        db.create_tenant(&tenant).unwrap();
        db.update_occupancy(property.id, OccupancyStatus::Occupied).unwrap();

        let directory = FailingDirectory::new(db);
        let err = archive_and_reset(&directory, property.id, tenant.id, "Lease completed")
            .unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidContractTerm));
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert_eq!(directory.deletes.get(), 0);

        let inner = &directory.inner;
        assert!(inner.list_archived_for_property(property.id).unwrap().is_empty());
        assert!(inner.find_tenant_by_id(tenant.id).unwrap().is_some());
    }
}
