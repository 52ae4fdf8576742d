//! Subscription limit checks
//!
//! Advisory only: callers run the check before creating a property. No
//! reservation is taken, so two concurrent creations can both pass.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::models::SubscriptionUsage;
use crate::storage::{PropertyRepository, SubscriptionRepository};

pub const SUBSCRIPTION_UNAVAILABLE: &str = "Could not fetch subscription data";
pub const SUBSCRIPTION_INACTIVE: &str =
    "Your subscription is not active. Please renew your plan to add properties.";

/// Whether a landlord may add another property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitDecision {
    Allowed,
    Denied { reason: String },
}

impl LimitDecision {
    pub fn can_add(&self) -> bool {
        matches!(self, LimitDecision::Allowed)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            LimitDecision::Allowed => None,
            LimitDecision::Denied { reason } => Some(reason),
        }
    }

    fn denied(reason: impl Into<String>) -> Self {
        LimitDecision::Denied {
            reason: reason.into(),
        }
    }
}

/// Load the subscription and count current properties
pub fn subscription_usage<D>(directory: &D, landlord_id: Uuid) -> Result<Option<SubscriptionUsage>>
where
    D: PropertyRepository + SubscriptionRepository + ?Sized,
{
    let Some(subscription) = directory.find_subscription(landlord_id)? else {
        return Ok(None);
    };
    let properties_used = directory.count_properties_for_landlord(landlord_id)?;
    Ok(Some(SubscriptionUsage {
        subscription,
        properties_used,
    }))
}

/// Decide from already-loaded usage
pub fn evaluate(usage: &SubscriptionUsage) -> LimitDecision {
    if !usage.subscription.is_active() {
        return LimitDecision::denied(SUBSCRIPTION_INACTIVE);
    }

    let limit = usage.property_limit();
    if usage.properties_used >= limit {
        return LimitDecision::denied(format!(
            "You have reached the maximum of {} properties on the {} plan. \
             Upgrade your subscription to add more.",
            limit, usage.subscription.plan
        ));
    }

    LimitDecision::Allowed
}

/// Check whether `landlord_id` can add a property; fails closed
pub fn can_add_property<D>(directory: &D, landlord_id: Uuid) -> LimitDecision
where
    D: PropertyRepository + SubscriptionRepository + ?Sized,
{
    let usage = match subscription_usage(directory, landlord_id) {
        Ok(Some(usage)) => usage,
        Ok(None) => {
            warn!(%landlord_id, "No subscription on profile");
            return LimitDecision::denied(SUBSCRIPTION_UNAVAILABLE);
        }
        Err(e) => {
            warn!(%landlord_id, error = %e, "Subscription lookup failed");
            return LimitDecision::denied(SUBSCRIPTION_UNAVAILABLE);
        }
    };

    let decision = evaluate(&usage);
    debug!(
        %landlord_id,
        used = usage.properties_used,
        limit = usage.property_limit(),
        allowed = decision.can_add(),
        "Property limit check"
    );
    decision
}
