//! Archived tenant snapshot storage
//!
//! Rows are insert-only.

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{format_date, parse_date, parse_datetime, parse_decimal, parse_uuid};
use crate::error::Result;
use crate::models::ArchivedTenant;

pub struct ArchiveStore<'a> {
    conn: &'a Connection,
}

fn row_to_archived(row: &Row<'_>) -> rusqlite::Result<ArchivedTenant> {
    Ok(ArchivedTenant {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        property_id: parse_uuid(&row.get::<_, String>(1)?)?,
        tenant_id: parse_uuid(&row.get::<_, String>(2)?)?,
        landlord_id: parse_uuid(&row.get::<_, String>(3)?)?,
        property_name: row.get(4)?,
        property_type: row.get(5)?,
        property_location: row.get(6)?,
        rent_amount: parse_decimal(&row.get::<_, String>(7)?)?,
        tenant_name: row.get(8)?,
        tenant_email: row.get(9)?,
        tenant_phone: row.get(10)?,
        contract_months: row.get(11)?,
        rent_start_date: parse_date(&row.get::<_, String>(12)?)?,
        rent_end_date: parse_date(&row.get::<_, String>(13)?)?,
        due_day: row.get(14)?,
        total_due: parse_decimal(&row.get::<_, String>(15)?)?,
        total_paid: parse_decimal(&row.get::<_, String>(16)?)?,
        billing_snapshot: row.get(17)?,
        archive_reason: row.get(18)?,
        archived_at: parse_datetime(&row.get::<_, String>(19)?)?,
    })
}

impl<'a> ArchiveStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    #[instrument(skip(self, archived), fields(property_id = %archived.property_id, tenant_id = %archived.tenant_id))]
    pub fn insert(&self, archived: &ArchivedTenant) -> Result<()> {
        self.conn.execute(
            "INSERT INTO archived_tenants (
                id, property_id, tenant_id, landlord_id, property_name, property_type,
                property_location, rent_amount, tenant_name, tenant_email, tenant_phone,
                contract_months, rent_start_date, rent_end_date, due_day, total_due,
                total_paid, billing_snapshot, archive_reason, archived_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     ?17, ?18, ?19, ?20)",
            params![
                archived.id.to_string(),
                archived.property_id.to_string(),
                archived.tenant_id.to_string(),
                archived.landlord_id.to_string(),
                archived.property_name,
                archived.property_type,
                archived.property_location,
                archived.rent_amount.to_string(),
                archived.tenant_name,
                archived.tenant_email,
                archived.tenant_phone,
                archived.contract_months,
                format_date(archived.rent_start_date),
                format_date(archived.rent_end_date),
                archived.due_day,
                archived.total_due.to_string(),
                archived.total_paid.to_string(),
                archived.billing_snapshot,
                archived.archive_reason,
                archived.archived_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Snapshots for a property, newest first
    #[instrument(skip(self))]
    pub fn list_for_property(&self, property_id: Uuid) -> Result<Vec<ArchivedTenant>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, property_id, tenant_id, landlord_id, property_name, property_type,
                    property_location, rent_amount, tenant_name, tenant_email, tenant_phone,
                    contract_months, rent_start_date, rent_end_date, due_day, total_due,
                    total_paid, billing_snapshot, archive_reason, archived_at
             FROM archived_tenants
             WHERE property_id = ?1
             ORDER BY archived_at DESC",
        )?;
        let archived = stmt
            .query_map(params![property_id.to_string()], row_to_archived)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(archived)
    }
}
