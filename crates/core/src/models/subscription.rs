//! Per-landlord subscription plan state

use chrono::{Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription plan tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Basic,
    Premium,
    Enterprise,
}

impl PlanTier {
    /// Maximum number of properties allowed on this tier
    pub fn property_limit(&self) -> u32 {
        match self {
            Self::Free => 3,
            Self::Basic => 10,
            Self::Premium => 50,
            Self::Enterprise => 999,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Premium => "premium",
            Self::Enterprise => "enterprise",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "free" => Some(Self::Free),
            "basic" => Some(Self::Basic),
            "premium" => Some(Self::Premium),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "cancelled" => Some(Self::Cancelled),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

/// Plan state stored on the landlord's profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub landlord_id: Uuid,
    pub plan: PlanTier,
    pub status: SubscriptionStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub last_payment_date: Option<NaiveDate>,
    pub next_billing_date: Option<NaiveDate>,
}

impl Subscription {
    /// Every new landlord starts on an active free plan
    pub fn free(landlord_id: Uuid) -> Self {
        Self {
            landlord_id,
            plan: PlanTier::Free,
            status: SubscriptionStatus::Active,
            start_date: Utc::now().date_naive(),
            end_date: None,
            last_payment_date: None,
            next_billing_date: None,
        }
    }

    pub fn property_limit(&self) -> u32 {
        self.plan.property_limit()
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Next billing date one calendar month after `from`
    pub fn next_billing_after(from: NaiveDate) -> Option<NaiveDate> {
        from.checked_add_months(Months::new(1))
    }
}

/// Subscription together with its derived usage count
#[derive(Debug, Clone)]
pub struct SubscriptionUsage {
    pub subscription: Subscription,
    pub properties_used: u32,
}

impl SubscriptionUsage {
    pub fn property_limit(&self) -> u32 {
        self.subscription.property_limit()
    }

    pub fn remaining(&self) -> u32 {
        self.property_limit().saturating_sub(self.properties_used)
    }
}
