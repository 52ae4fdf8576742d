//! Tenant portal view model
//!
//! Tenants sign in with the email or phone on their record. The portal
//! session is two keys in local client storage.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info};
use unitko_core::storage::{BillingRepository, PropertyRepository, TenantRepository};
use unitko_core::{
    billing_totals, BillingEntry, BillingTotals, Error, Property, Result, StorageScope, Tenant,
    TENANT_IDENTIFIER_KEY, TENANT_ID_KEY,
};
use uuid::Uuid;

use super::{Navigator, Route};
use crate::state::AppState;

/// What the tenant dashboard shows
#[derive(Debug, Clone)]
pub struct TenantBillingStatus {
    pub tenant: Tenant,
    pub property: Property,
    pub entries: Vec<BillingEntry>,
    pub totals: BillingTotals,
}

impl TenantBillingStatus {
    pub fn outstanding(&self) -> Decimal {
        self.totals.outstanding()
    }
}

pub struct TenantPortal {
    state: Arc<AppState>,
    navigator: Arc<dyn Navigator>,
}

impl TenantPortal {
    pub fn new(state: Arc<AppState>, navigator: Arc<dyn Navigator>) -> Self {
        Self { state, navigator }
    }

    /// Resolve an active tenant by email or phone and open the dashboard
    pub async fn sign_in(&self, identifier: &str) -> Result<Tenant> {
        let identifier = identifier.trim().to_string();
        if identifier.is_empty() {
            return Err(Error::ValidationFailed(
                "Please enter your email or phone number".to_string(),
            ));
        }

        let tenant = self
            .state
            .with_db(move |db| {
                let tenant = db.find_active_tenant_by_contact(&identifier)?.ok_or_else(|| {
                    Error::NotFound(
                        "No active tenant found with that email or phone number".to_string(),
                    )
                })?;
                let storage = db.client_storage();
                storage.set(StorageScope::Local, TENANT_ID_KEY, &tenant.id.to_string())?;
                storage.set(StorageScope::Local, TENANT_IDENTIFIER_KEY, &identifier)?;
                Ok(tenant)
            })
            .await?;

        info!(tenant_id = %tenant.id, "Tenant signed in");
        self.navigator.navigate(Route::TenantDashboard);
        Ok(tenant)
    }

    /// The signed-in tenant, if their record is still active
    ///
    /// A stored id whose tenant has since been archived is forgotten.
    pub async fn current_tenant(&self) -> Result<Option<Tenant>> {
        self.state
            .with_db(|db| {
                let storage = db.client_storage();
                let Some(raw) = storage.get(StorageScope::Local, TENANT_ID_KEY)? else {
                    return Ok(None);
                };
                let tenant = match Uuid::parse_str(&raw) {
                    Ok(id) => db.find_tenant_by_id(id)?.filter(|t| t.is_active),
                    Err(_) => None,
                };
                if tenant.is_none() {
                    debug!("Stored tenant no longer active, clearing portal session");
                    storage.remove(StorageScope::Local, TENANT_ID_KEY)?;
                    storage.remove(StorageScope::Local, TENANT_IDENTIFIER_KEY)?;
                }
                Ok(tenant)
            })
            .await
    }

    /// Redirect to the tenant login when nobody is signed in
    pub async fn mount(&self) -> Option<Tenant> {
        match self.current_tenant().await {
            Ok(Some(tenant)) => Some(tenant),
            Ok(None) => {
                self.navigator.navigate(Route::TenantLogin);
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Tenant session lookup failed");
                self.navigator.navigate(Route::TenantLogin);
                None
            }
        }
    }

    pub async fn billing_status(&self) -> Result<TenantBillingStatus> {
        let tenant = self
            .current_tenant()
            .await?
            .ok_or_else(|| Error::Authentication("Tenant not signed in".to_string()))?;

        self.state
            .with_db(move |db| {
                let property = db
                    .find_property_by_id(tenant.property_id)?
                    .ok_or_else(|| Error::NotFound(format!("property {}", tenant.property_id)))?;
                let entries = db.list_billing_for_tenant(tenant.id)?;
                let totals = billing_totals(&entries);
                Ok(TenantBillingStatus {
                    tenant,
                    property,
                    entries,
                    totals,
                })
            })
            .await
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.state
            .with_db(|db| {
                let storage = db.client_storage();
                storage.remove(StorageScope::Local, TENANT_ID_KEY)?;
                storage.remove(StorageScope::Local, TENANT_IDENTIFIER_KEY)
            })
            .await?;

        info!("Tenant signed out");
        self.navigator.navigate(Route::TenantLogin);
        Ok(())
    }
}
