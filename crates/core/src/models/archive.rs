//! Archived tenant snapshot - write-once history of a finished occupancy

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BillingEntry;

/// Denormalized copy of property, tenant and billing facts at archive time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedTenant {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub landlord_id: Uuid,
    pub property_name: String,
    pub property_type: String,
    pub property_location: String,
    pub rent_amount: Decimal,
    pub tenant_name: String,
    pub tenant_email: Option<String>,
    pub tenant_phone: Option<String>,
    pub contract_months: u32,
    pub rent_start_date: NaiveDate,
    pub rent_end_date: NaiveDate,
    pub due_day: u8,
    pub total_due: Decimal,
    pub total_paid: Decimal,
    /// JSON array of the billing entries at archive time
    pub billing_snapshot: String,
    pub archive_reason: String,
    pub archived_at: DateTime<Utc>,
}

impl ArchivedTenant {
    /// Decode the billing snapshot back into entries
    pub fn billing_entries(&self) -> serde_json::Result<Vec<BillingEntry>> {
        serde_json::from_str(&self.billing_snapshot)
    }
}
