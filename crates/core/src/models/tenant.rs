//! Tenant model - an occupant of exactly one property

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Active occupant record
///
/// Tenants are never reactivated. A new occupancy creates a new record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub contract_months: u32,
    pub rent_start_date: NaiveDate,
    /// Day of month rent is due (1-31)
    pub due_day: u8,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    pub fn new(
        property_id: Uuid,
        name: String,
        contract_months: u32,
        rent_start_date: NaiveDate,
        due_day: u8,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            property_id,
            name,
            email: None,
            phone: None,
            contract_months,
            rent_start_date,
            due_day,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    pub fn with_phone(mut self, phone: String) -> Self {
        self.phone = Some(phone);
        self
    }

    /// Whether `identifier` matches this tenant's email (case-insensitive) or phone
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        let identifier = identifier.trim();
        let email_match = self
            .email
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(identifier));
        let phone_match = self.phone.as_deref().is_some_and(|p| p == identifier);
        email_match || phone_match
    }
}
