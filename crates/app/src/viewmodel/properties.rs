//! Landlord property management view model

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};
use unitko_core::invariants::assert_occupancy_invariants;
use unitko_core::limits::{evaluate, subscription_usage};
use unitko_core::storage::{
    ArchiveRepository, BillingRepository, PropertyRepository, SubscriptionRepository,
    TenantRepository,
};
use unitko_core::{
    archive_and_reset, can_add_property, check_session, ArchiveOutcome, ArchivedTenant,
    BillingEntry, ChargeItem, Database, Error, LimitDecision, OccupancyStatus, PlanTier,
    Property, Result, Subscription, SubscriptionUsage, Tenant,
};
use uuid::Uuid;

use crate::state::AppState;

pub const MIN_ARCHIVE_REMARKS: usize = 10;
/// Largest rent or charge amount a form may carry
pub const MAX_AMOUNT: i64 = 1_000_000_000;

/// New property form input
#[derive(Debug, Clone)]
pub struct PropertyForm {
    pub name: String,
    pub property_type: String,
    pub location: String,
    pub rent_amount: Decimal,
}

/// Move-in form input
#[derive(Debug, Clone)]
pub struct TenantForm {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub contract_months: u32,
    pub rent_start_date: NaiveDate,
    pub due_day: u8,
}

/// Landlord dashboard totals
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub total_properties: usize,
    pub occupied: usize,
    pub vacant: usize,
    /// Sum of rent across occupied units
    pub monthly_rent_roll: Decimal,
    pub usage: Option<SubscriptionUsage>,
}

impl DashboardSummary {
    pub fn from_properties(properties: &[Property], usage: Option<SubscriptionUsage>) -> Self {
        let occupied: Vec<&Property> = properties.iter().filter(|p| p.is_occupied()).collect();
        Self {
            total_properties: properties.len(),
            occupied: occupied.len(),
            vacant: properties.len() - occupied.len(),
            monthly_rent_roll: occupied.iter().map(|p| p.rent_amount).sum(),
            usage,
        }
    }
}

fn non_blank(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::ValidationFailed(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

fn optional_contact(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Load a property owned by `landlord_id`
fn owned_property(db: &Database, landlord_id: Uuid, property_id: Uuid) -> Result<Property> {
    db.find_property_by_id(property_id)?
        .filter(|p| p.landlord_id == landlord_id)
        .ok_or_else(|| Error::NotFound("Property not found".to_string()))
}

pub struct PropertyManager {
    state: Arc<AppState>,
}

impl PropertyManager {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    async fn landlord_id(&self) -> Result<Uuid> {
        let session = self
            .state
            .with_identity(|identity| identity.current_session())
            .await?;
        if !check_session(session.as_ref()).is_valid() {
            return Err(Error::Authentication("Not signed in".to_string()));
        }
        session
            .and_then(|s| s.user_id())
            .ok_or_else(|| Error::Authentication("Not signed in".to_string()))
    }

    /// Check the plan limit, then create the property as vacant
    pub async fn add_property(&self, form: PropertyForm) -> Result<Property> {
        let landlord_id = self.landlord_id().await?;
        let name = non_blank(&form.name, "Property name")?;
        let property_type = non_blank(&form.property_type, "Property type")?;
        let location = non_blank(&form.location, "Location")?;
        if form.rent_amount <= Decimal::ZERO {
            return Err(Error::ValidationFailed(
                "Rent amount must be greater than zero".to_string(),
            ));
        }
        if form.rent_amount > Decimal::from(MAX_AMOUNT) {
            return Err(Error::ValidationFailed(format!(
                "Rent amount cannot exceed {}",
                MAX_AMOUNT
            )));
        }

        let property = self
            .state
            .with_db(move |db| {
                if let LimitDecision::Denied { reason } = can_add_property(db, landlord_id) {
                    return Err(Error::ValidationFailed(reason));
                }
                let property =
                    Property::new(landlord_id, name, property_type, location, form.rent_amount);
                db.create_property(&property)?;
                Ok(property)
            })
            .await?;

        info!(property_id = %property.id, "Property added");
        Ok(property)
    }

    pub async fn list_properties(&self) -> Result<Vec<Property>> {
        let landlord_id = self.landlord_id().await?;
        self.state
            .with_db(move |db| db.list_properties_for_landlord(landlord_id))
            .await
    }

    pub async fn dashboard_summary(&self) -> Result<DashboardSummary> {
        let landlord_id = self.landlord_id().await?;
        self.state
            .with_db(move |db| {
                let properties = db.list_properties_for_landlord(landlord_id)?;
                let usage = subscription_usage(db, landlord_id)?;
                Ok(DashboardSummary::from_properties(&properties, usage))
            })
            .await
    }

    /// Whether another property may be added, with the reason when not
    pub async fn limit_decision(&self) -> Result<LimitDecision> {
        let landlord_id = self.landlord_id().await?;
        self.state
            .with_db(move |db| Ok(can_add_property(db, landlord_id)))
            .await
    }

    /// Create a tenant on a vacant property and mark it occupied
    pub async fn move_in_tenant(&self, property_id: Uuid, form: TenantForm) -> Result<Tenant> {
        let landlord_id = self.landlord_id().await?;
        let name = non_blank(&form.name, "Tenant name")?;
        if form.contract_months == 0 {
            return Err(Error::ValidationFailed(
                "Contract length must be at least one month".to_string(),
            ));
        }
        if !(1..=31).contains(&form.due_day) {
            return Err(Error::ValidationFailed(
                "Due day must be between 1 and 31".to_string(),
            ));
        }

        let tenant = self
            .state
            .with_db(move |db| {
                let mut property = owned_property(db, landlord_id, property_id)?;
                let has_tenant = db.find_active_tenant_for_property(property_id)?.is_some();
                if property.is_occupied() || has_tenant {
                    return Err(Error::ValidationFailed(
                        "Property already has an active tenant".to_string(),
                    ));
                }

                let mut tenant = Tenant::new(
                    property_id,
                    name,
                    form.contract_months,
                    form.rent_start_date,
                    form.due_day,
                );
                tenant.email = optional_contact(form.email);
                tenant.phone = optional_contact(form.phone);
                db.create_tenant(&tenant)?;
                db.update_occupancy(property_id, OccupancyStatus::Occupied)?;

                property.occupancy_status = OccupancyStatus::Occupied;
                assert_occupancy_invariants(&property, Some(&tenant));
                Ok(tenant)
            })
            .await?;

        info!(tenant_id = %tenant.id, %property_id, "Tenant moved in");
        Ok(tenant)
    }

    /// Bill the active tenant for the next period at the property's rent
    pub async fn add_billing_entry(
        &self,
        tenant_id: Uuid,
        due_date: NaiveDate,
        charges: Vec<ChargeItem>,
    ) -> Result<BillingEntry> {
        let landlord_id = self.landlord_id().await?;
        if charges.iter().any(|c| c.amount < Decimal::ZERO) {
            return Err(Error::ValidationFailed(
                "Charges cannot be negative".to_string(),
            ));
        }
        if charges.iter().any(|c| c.amount > Decimal::from(MAX_AMOUNT)) {
            return Err(Error::ValidationFailed(format!(
                "A single charge cannot exceed {}",
                MAX_AMOUNT
            )));
        }

        self.state
            .with_db(move |db| {
                let tenant = db
                    .find_tenant_by_id(tenant_id)?
                    .filter(|t| t.is_active)
                    .ok_or_else(|| Error::NotFound("Tenant not found".to_string()))?;
                let property = owned_property(db, landlord_id, tenant.property_id)?;

                let next_period = db
                    .list_billing_for_tenant(tenant_id)?
                    .last()
                    .map_or(1, |e| e.billing_period + 1);
                let entry = BillingEntry::new(
                    tenant_id,
                    property.id,
                    next_period,
                    due_date,
                    property.rent_amount,
                    charges,
                );
                db.create_billing_entry(&entry)?;
                Ok(entry)
            })
            .await
    }

    /// Set the status of an entry billed on one of the landlord's properties
    pub async fn update_billing_status(&self, entry_id: Uuid, status: &str) -> Result<()> {
        let landlord_id = self.landlord_id().await?;
        let status = non_blank(status, "Status")?;
        self.state
            .with_db(move |db| {
                let entry = db
                    .find_billing_entry(entry_id)?
                    .ok_or_else(|| Error::NotFound("Billing entry not found".to_string()))?;
                owned_property(db, landlord_id, entry.property_id)
                    .map_err(|_| Error::NotFound("Billing entry not found".to_string()))?;
                db.update_billing_status(entry_id, &status)
            })
            .await
    }

    /// Archive the tenant and reset the property
    ///
    /// Remarks shorter than [`MIN_ARCHIVE_REMARKS`] are rejected before any
    /// directory call.
    pub async fn archive_and_reset(
        &self,
        property_id: Uuid,
        tenant_id: Uuid,
        remarks: &str,
    ) -> ArchiveOutcome {
        let remarks = remarks.trim().to_string();
        if remarks.chars().count() < MIN_ARCHIVE_REMARKS {
            return ArchiveOutcome {
                success: false,
                error: Some(format!(
                    "Please provide remarks of at least {} characters",
                    MIN_ARCHIVE_REMARKS
                )),
            };
        }

        let landlord_id = match self.landlord_id().await {
            Ok(id) => id,
            Err(e) => {
                return ArchiveOutcome {
                    success: false,
                    error: Some(e.to_string()),
                }
            }
        };

        let result = self
            .state
            .with_db(move |db| {
                owned_property(db, landlord_id, property_id)?;
                Ok(archive_and_reset(db, property_id, tenant_id, &remarks))
            })
            .await;

        match result {
            Ok(result) => {
                if let Err(e) = &result {
                    warn!(error = %e, kind = ?e.kind(), "Archive and reset failed");
                }
                ArchiveOutcome::from(&result)
            }
            Err(e) => ArchiveOutcome {
                success: false,
                error: Some(e.to_string()),
            },
        }
    }

    /// Past occupancies of a property, newest first
    pub async fn archive_history(&self, property_id: Uuid) -> Result<Vec<ArchivedTenant>> {
        let landlord_id = self.landlord_id().await?;
        self.state
            .with_db(move |db| {
                owned_property(db, landlord_id, property_id)?;
                db.list_archived_for_property(property_id)
            })
            .await
    }

    /// Move to a new plan tier and return the updated subscription
    pub async fn change_plan(&self, plan: PlanTier) -> Result<Subscription> {
        let landlord_id = self.landlord_id().await?;
        let subscription = self
            .state
            .with_db(move |db| {
                db.update_plan(landlord_id, plan)?;
                db.find_subscription(landlord_id)?
                    .ok_or_else(|| Error::NotFound("Subscription not found".to_string()))
            })
            .await?;

        info!(%plan, "Plan changed");
        Ok(subscription)
    }

    /// Usage against the current plan and the resulting limit decision
    pub async fn plan_usage(&self) -> Result<Option<(SubscriptionUsage, LimitDecision)>> {
        let landlord_id = self.landlord_id().await?;
        self.state
            .with_db(move |db| {
                Ok(subscription_usage(db, landlord_id)?.map(|usage| {
                    let decision = evaluate(&usage);
                    (usage, decision)
                }))
            })
            .await
    }
}
