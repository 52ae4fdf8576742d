//! Billing entry storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{
    format_date, parse_date, parse_datetime, parse_decimal, parse_uuid, OptionalExt,
};
use crate::error::{Error, Result};
use crate::invariants::assert_billing_invariants;
use crate::models::{BillingEntry, ChargeItem};

pub struct BillingStore<'a> {
    conn: &'a Connection,
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<BillingEntry> {
    let charges_json: String = row.get(5)?;
    let charges: Vec<ChargeItem> = serde_json::from_str(&charges_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(BillingEntry {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        tenant_id: parse_uuid(&row.get::<_, String>(1)?)?,
        property_id: parse_uuid(&row.get::<_, String>(2)?)?,
        due_date: parse_date(&row.get::<_, String>(3)?)?,
        rent_due: parse_decimal(&row.get::<_, String>(4)?)?,
        charges,
        other_charges: parse_decimal(&row.get::<_, String>(6)?)?,
        gross_due: parse_decimal(&row.get::<_, String>(7)?)?,
        status: row.get(8)?,
        billing_period: row.get(9)?,
        created_at: parse_datetime(&row.get::<_, String>(10)?)?,
    })
}

impl<'a> BillingStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a billing entry
    #[instrument(skip(self, entry), fields(tenant_id = %entry.tenant_id, period = entry.billing_period))]
    pub fn create(&self, entry: &BillingEntry) -> Result<()> {
        assert_billing_invariants(entry);
        let charges_json = serde_json::to_string(&entry.charges)?;
        self.conn.execute(
            "INSERT INTO billing_entries (id, tenant_id, property_id, due_date, rent_due,
                                          charges_json, other_charges, gross_due, status,
                                          billing_period, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                entry.id.to_string(),
                entry.tenant_id.to_string(),
                entry.property_id.to_string(),
                format_date(entry.due_date),
                entry.rent_due.to_string(),
                charges_json,
                entry.other_charges.to_string(),
                entry.gross_due.to_string(),
                entry.status,
                entry.billing_period,
                entry.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// List entries for a tenant, ordered by billing period ascending
    #[instrument(skip(self))]
    pub fn list_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<BillingEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, tenant_id, property_id, due_date, rent_due, charges_json, other_charges,
                    gross_due, status, billing_period, created_at
             FROM billing_entries
             WHERE tenant_id = ?1
             ORDER BY billing_period ASC",
        )?;
        let entries = stmt
            .query_map(params![tenant_id.to_string()], row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    #[instrument(skip(self))]
    pub fn find_by_id(&self, entry_id: Uuid) -> Result<Option<BillingEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, tenant_id, property_id, due_date, rent_due, charges_json, other_charges,
                    gross_due, status, billing_period, created_at
             FROM billing_entries
             WHERE id = ?1",
        )?;
        let entry = stmt
            .query_row(params![entry_id.to_string()], row_to_entry)
            .optional()?;
        Ok(entry)
    }

    #[instrument(skip(self))]
    pub fn update_status(&self, entry_id: Uuid, status: &str) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE billing_entries SET status = ?1 WHERE id = ?2",
            params![status, entry_id.to_string()],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("billing entry {}", entry_id)));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn delete_for_tenant(&self, tenant_id: Uuid) -> Result<u64> {
        let count = self.conn.execute(
            "DELETE FROM billing_entries WHERE tenant_id = ?1",
            params![tenant_id.to_string()],
        )?;
        Ok(count as u64)
    }
}
