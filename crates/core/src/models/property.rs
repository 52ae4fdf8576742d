//! Property model - a rental unit owned by a landlord

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a property currently has an active tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyStatus {
    Occupied,
    Vacant,
}

impl OccupancyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Occupied => "occupied",
            Self::Vacant => "vacant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "occupied" => Some(Self::Occupied),
            "vacant" => Some(Self::Vacant),
            _ => None,
        }
    }
}

impl std::fmt::Display for OccupancyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rental unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub name: String,
    pub property_type: String,
    pub location: String,
    pub rent_amount: Decimal,
    pub occupancy_status: OccupancyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// New properties start out vacant
    pub fn new(
        landlord_id: Uuid,
        name: String,
        property_type: String,
        location: String,
        rent_amount: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            landlord_id,
            name,
            property_type,
            location,
            rent_amount,
            occupancy_status: OccupancyStatus::Vacant,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupancy_status == OccupancyStatus::Occupied
    }
}
