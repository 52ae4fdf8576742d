//! View models
//!
//! Controllers hold the per-view state a UI binds to and decide where to
//! navigate. Rendering is left to whatever front end drives them.

pub mod auth;
pub mod guard;
pub mod properties;
pub mod tenant;

pub use auth::LoginController;
pub use guard::{is_landlord_authenticated, GateState, LandlordGate};
pub use properties::{DashboardSummary, PropertyForm, PropertyManager, TenantForm};
pub use tenant::{TenantBillingStatus, TenantPortal};

/// Navigable surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    LandlordLogin,
    LandlordDashboard,
    TenantLogin,
    TenantDashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::LandlordLogin => "/landlord/login",
            Self::LandlordDashboard => "/landlord/dashboard",
            Self::TenantLogin => "/tenant/login",
            Self::TenantDashboard => "/tenant/dashboard",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Performs navigation decided by a controller
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that only logs; used by the headless binary
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(%route, "Navigate");
    }
}
