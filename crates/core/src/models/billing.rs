//! Billing entry model - one periodic charge for an active tenant

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named line item added on top of rent (water, electricity, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeItem {
    pub name: String,
    pub amount: Decimal,
}

/// One billing cycle for a tenant
///
/// `gross_due` is always `rent_due + other_charges`; construct through
/// [`BillingEntry::new`] to keep it that way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub property_id: Uuid,
    pub due_date: NaiveDate,
    pub rent_due: Decimal,
    pub charges: Vec<ChargeItem>,
    pub other_charges: Decimal,
    pub gross_due: Decimal,
    /// Free text, e.g. "Paid", "Pending", "Good Standing"
    pub status: String,
    pub billing_period: u32,
    pub created_at: DateTime<Utc>,
}

impl BillingEntry {
    pub fn new(
        tenant_id: Uuid,
        property_id: Uuid,
        billing_period: u32,
        due_date: NaiveDate,
        rent_due: Decimal,
        charges: Vec<ChargeItem>,
    ) -> Self {
        let other_charges = charges
            .iter()
            .fold(Decimal::ZERO, |total, c| total.saturating_add(c.amount));
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            property_id,
            due_date,
            rent_due,
            charges,
            other_charges,
            gross_due: rent_due.saturating_add(other_charges),
            status: "Pending".to_string(),
            billing_period,
            created_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Whether the status text counts toward the paid total
    pub fn counts_as_paid(&self) -> bool {
        let status = self.status.to_lowercase();
        status.contains("paid") || status.contains("good standing")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: &str) -> BillingEntry {
        BillingEntry::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            1,
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            Decimal::from(1000),
            Vec::new(),
        )
        .with_status(status)
    }

    #[test]
    fn test_gross_due_includes_charges() {
        let entry = BillingEntry::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            1,
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            Decimal::from(8000),
            vec![
                ChargeItem {
                    name: "Water".into(),
                    amount: Decimal::from(350),
                },
                ChargeItem {
                    name: "Electricity".into(),
                    amount: Decimal::from(1200),
                },
            ],
        );
        assert_eq!(entry.other_charges, Decimal::from(1550));
        assert_eq!(entry.gross_due, Decimal::from(9550));
        assert_eq!(entry.status, "Pending");
    }

    #[test]
    fn test_counts_as_paid() {
        assert!(entry("Paid").counts_as_paid());
        assert!(entry("GOOD STANDING").counts_as_paid());
        assert!(!entry("Pending").counts_as_paid());
        assert!(!entry("Overdue").counts_as_paid());
    }
}
