//! Property storage operations

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_decimal, parse_occupancy, parse_uuid, OptionalExt};
use crate::error::{Error, Result};
use crate::models::{OccupancyStatus, Property};

const PROPERTY_COLUMNS: &str = "id, landlord_id, name, property_type, location, rent_amount,
     occupancy_status, created_at, updated_at";

pub struct PropertyStore<'a> {
    conn: &'a Connection,
}

fn row_to_property(row: &Row<'_>) -> rusqlite::Result<Property> {
    Ok(Property {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        landlord_id: parse_uuid(&row.get::<_, String>(1)?)?,
        name: row.get(2)?,
        property_type: row.get(3)?,
        location: row.get(4)?,
        rent_amount: parse_decimal(&row.get::<_, String>(5)?)?,
        occupancy_status: parse_occupancy(&row.get::<_, String>(6)?)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(8)?)?,
    })
}

impl<'a> PropertyStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new property
    #[instrument(skip(self, property), fields(property_name = %property.name))]
    pub fn create(&self, property: &Property) -> Result<()> {
        self.conn.execute(
            "INSERT INTO properties (id, landlord_id, name, property_type, location, rent_amount,
                                     occupancy_status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                property.id.to_string(),
                property.landlord_id.to_string(),
                property.name,
                property.property_type,
                property.location,
                property.rent_amount.to_string(),
                property.occupancy_status.as_str(),
                property.created_at.to_rfc3339(),
                property.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find property by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Property>> {
        let sql = format!("SELECT {} FROM properties WHERE id = ?1", PROPERTY_COLUMNS);
        let property = self
            .conn
            .query_row(&sql, params![id.to_string()], row_to_property)
            .optional()?;
        Ok(property)
    }

    /// List properties owned by a landlord, by name
    #[instrument(skip(self))]
    pub fn list_for_landlord(&self, landlord_id: Uuid) -> Result<Vec<Property>> {
        let sql = format!(
            "SELECT {} FROM properties WHERE landlord_id = ?1 ORDER BY name",
            PROPERTY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let properties = stmt
            .query_map(params![landlord_id.to_string()], row_to_property)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(properties)
    }

    pub fn count_for_landlord(&self, landlord_id: Uuid) -> Result<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM properties WHERE landlord_id = ?1",
            params![landlord_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Partial update of the occupancy status
    #[instrument(skip(self))]
    pub fn update_occupancy(&self, property_id: Uuid, status: OccupancyStatus) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE properties SET occupancy_status = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                status.as_str(),
                Utc::now().to_rfc3339(),
                property_id.to_string()
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("property {}", property_id)));
        }
        Ok(())
    }
}
