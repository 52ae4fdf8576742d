//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use uuid::Uuid;

use crate::models::{ArchivedTenant, BillingEntry, OccupancyStatus, Property, Tenant};

/// Occupancy must agree with whether an active tenant exists
pub fn assert_occupancy_invariants(property: &Property, active_tenant: Option<&Tenant>) {
    let has_tenant = active_tenant.is_some();
    debug_assert!(
        (property.occupancy_status == OccupancyStatus::Occupied) == has_tenant,
        "Property {} is {} but active tenant present = {}",
        property.id,
        property.occupancy_status,
        has_tenant
    );

    if let Some(tenant) = active_tenant {
        debug_assert!(
            tenant.property_id == property.id,
            "Tenant {} listed under property {} but belongs to {}",
            tenant.id,
            property.id,
            tenant.property_id
        );
    }
}

/// Gross due is rent plus the sum of the line items
pub fn assert_billing_invariants(entry: &BillingEntry) {
    debug_assert!(
        entry.gross_due == entry.rent_due.saturating_add(entry.other_charges),
        "Billing entry {} gross {} != rent {} + other {}",
        entry.id,
        entry.gross_due,
        entry.rent_due,
        entry.other_charges
    );

    let itemized = entry
        .charges
        .iter()
        .fold(rust_decimal::Decimal::ZERO, |total, c| total.saturating_add(c.amount));
    debug_assert!(
        itemized == entry.other_charges,
        "Billing entry {} other charges {} != itemized {}",
        entry.id,
        entry.other_charges,
        itemized
    );
}

pub fn assert_archive_invariants(archive: &ArchivedTenant) {
    debug_assert!(
        !archive.archive_reason.trim().is_empty(),
        "Archive {} has empty reason",
        archive.id
    );

    debug_assert!(
        archive.rent_end_date >= archive.rent_start_date,
        "Archive {} ends {} before it starts {}",
        archive.id,
        archive.rent_end_date,
        archive.rent_start_date
    );
}

/// Validate that an ID is not nil
pub fn assert_id_valid(id: Uuid, context: &str) {
    debug_assert!(id != Uuid::nil(), "Nil id in context: {}", context);
}
