//! Landlord profile storage - subscription plan state

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{
    format_date, parse_date, parse_date_opt, parse_plan, parse_subscription_status, parse_uuid,
    OptionalExt,
};
use crate::error::{Error, Result};
use crate::models::{PlanTier, Subscription, SubscriptionStatus};

pub struct ProfileStore<'a> {
    conn: &'a Connection,
}

impl<'a> ProfileStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    #[instrument(skip(self, subscription), fields(landlord_id = %subscription.landlord_id, plan = %subscription.plan))]
    pub fn create(&self, subscription: &Subscription) -> Result<()> {
        self.conn.execute(
            "INSERT INTO profiles (landlord_id, plan, status, start_date, end_date,
                                   last_payment_date, next_billing_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                subscription.landlord_id.to_string(),
                subscription.plan.as_str(),
                subscription.status.as_str(),
                format_date(subscription.start_date),
                subscription.end_date.map(format_date),
                subscription.last_payment_date.map(format_date),
                subscription.next_billing_date.map(format_date),
            ],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn find(&self, landlord_id: Uuid) -> Result<Option<Subscription>> {
        let subscription = self
            .conn
            .query_row(
                "SELECT landlord_id, plan, status, start_date, end_date, last_payment_date,
                        next_billing_date
                 FROM profiles WHERE landlord_id = ?1",
                params![landlord_id.to_string()],
                |row| {
                    Ok(Subscription {
                        landlord_id: parse_uuid(&row.get::<_, String>(0)?)?,
                        plan: parse_plan(&row.get::<_, String>(1)?)?,
                        status: parse_subscription_status(&row.get::<_, String>(2)?)?,
                        start_date: parse_date(&row.get::<_, String>(3)?)?,
                        end_date: parse_date_opt(row.get(4)?)?,
                        last_payment_date: parse_date_opt(row.get(5)?)?,
                        next_billing_date: parse_date_opt(row.get(6)?)?,
                    })
                },
            )
            .optional()?;
        Ok(subscription)
    }

    /// Switch plans; counts as a payment today with the next bill a month out
    #[instrument(skip(self))]
    pub fn update_plan(&self, landlord_id: Uuid, plan: PlanTier) -> Result<()> {
        let today = Utc::now().date_naive();
        let next_billing = Subscription::next_billing_after(today);
        let updated = self.conn.execute(
            "UPDATE profiles
             SET plan = ?1, status = 'active', last_payment_date = ?2, next_billing_date = ?3
             WHERE landlord_id = ?4",
            params![
                plan.as_str(),
                format_date(today),
                next_billing.map(format_date),
                landlord_id.to_string(),
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("profile for landlord {}", landlord_id)));
        }
        Ok(())
    }

    /// Record a lapse or cancellation without changing the plan
    #[instrument(skip(self))]
    pub fn update_status(&self, landlord_id: Uuid, status: SubscriptionStatus) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE profiles SET status = ?1 WHERE landlord_id = ?2",
            params![status.as_str(), landlord_id.to_string()],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("profile for landlord {}", landlord_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::create_landlord;
    use crate::storage::Database;

    #[test]
    fn test_create_and_upgrade() {
        let db = Database::open_in_memory().unwrap();
        let landlord_id = create_landlord(&db);

        db.profiles().create(&Subscription::free(landlord_id)).unwrap();
        let sub = db.profiles().find(landlord_id).unwrap().unwrap();
        assert_eq!(sub.plan, PlanTier::Free);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.next_billing_date.is_none());

        db.profiles().update_plan(landlord_id, PlanTier::Premium).unwrap();
        let sub = db.profiles().find(landlord_id).unwrap().unwrap();
        assert_eq!(sub.plan, PlanTier::Premium);
        assert!(sub.next_billing_date.is_some());
        assert_eq!(sub.property_limit(), 50);

        db.profiles()
            .update_status(landlord_id, SubscriptionStatus::Cancelled)
            .unwrap();
        let sub = db.profiles().find(landlord_id).unwrap().unwrap();
        assert!(!sub.is_active());
        assert_eq!(sub.plan, PlanTier::Premium);
    }

    #[test]
    fn test_update_plan_missing_profile() {
        let db = Database::open_in_memory().unwrap();
        let result = db.profiles().update_plan(Uuid::new_v4(), PlanTier::Basic);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
