//! Tenant storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{format_date, parse_date, parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::Tenant;

const TENANT_COLUMNS: &str = "id, property_id, name, email, phone, contract_months,
     rent_start_date, due_day, is_active, created_at";

pub struct TenantStore<'a> {
    conn: &'a Connection,
}

fn row_to_tenant(row: &Row<'_>) -> rusqlite::Result<Tenant> {
    Ok(Tenant {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        property_id: parse_uuid(&row.get::<_, String>(1)?)?,
        name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        contract_months: row.get(5)?,
        rent_start_date: parse_date(&row.get::<_, String>(6)?)?,
        due_day: row.get(7)?,
        is_active: row.get::<_, i32>(8)? != 0,
        created_at: parse_datetime(&row.get::<_, String>(9)?)?,
    })
}

impl<'a> TenantStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new tenant
    #[instrument(skip(self, tenant), fields(tenant_id = %tenant.id, property_id = %tenant.property_id))]
    pub fn create(&self, tenant: &Tenant) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tenants (id, property_id, name, email, phone, contract_months,
                                  rent_start_date, due_day, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                tenant.id.to_string(),
                tenant.property_id.to_string(),
                tenant.name,
                tenant.email,
                tenant.phone,
                tenant.contract_months,
                format_date(tenant.rent_start_date),
                tenant.due_day,
                tenant.is_active as i32,
                tenant.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn find_by_id(&self, tenant_id: Uuid) -> Result<Option<Tenant>> {
        let sql = format!("SELECT {} FROM tenants WHERE id = ?1", TENANT_COLUMNS);
        let tenant = self
            .conn
            .query_row(&sql, params![tenant_id.to_string()], row_to_tenant)
            .optional()?;
        Ok(tenant)
    }

    /// Find tenant by ID and owning property
    #[instrument(skip(self))]
    pub fn find_for_property(&self, tenant_id: Uuid, property_id: Uuid) -> Result<Option<Tenant>> {
        let sql = format!(
            "SELECT {} FROM tenants WHERE id = ?1 AND property_id = ?2",
            TENANT_COLUMNS
        );
        let tenant = self
            .conn
            .query_row(
                &sql,
                params![tenant_id.to_string(), property_id.to_string()],
                row_to_tenant,
            )
            .optional()?;
        Ok(tenant)
    }

    #[instrument(skip(self))]
    pub fn find_active_for_property(&self, property_id: Uuid) -> Result<Option<Tenant>> {
        let sql = format!(
            "SELECT {} FROM tenants WHERE property_id = ?1 AND is_active = 1
             ORDER BY created_at DESC LIMIT 1",
            TENANT_COLUMNS
        );
        let tenant = self
            .conn
            .query_row(&sql, params![property_id.to_string()], row_to_tenant)
            .optional()?;
        Ok(tenant)
    }

    /// Find an active tenant whose email (case-insensitive) or phone matches
    #[instrument(skip(self, identifier))]
    pub fn find_active_by_contact(&self, identifier: &str) -> Result<Option<Tenant>> {
        let identifier = identifier.trim();
        let sql = format!(
            "SELECT {} FROM tenants
             WHERE is_active = 1 AND (email = ?1 COLLATE NOCASE OR phone = ?1)
             ORDER BY created_at DESC LIMIT 1",
            TENANT_COLUMNS
        );
        let tenant = self
            .conn
            .query_row(&sql, params![identifier], row_to_tenant)
            .optional()?;
        Ok(tenant)
    }

    #[instrument(skip(self))]
    pub fn delete(&self, tenant_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM tenants WHERE id = ?1",
            params![tenant_id.to_string()],
        )?;
        Ok(())
    }
}
