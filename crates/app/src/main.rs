//! UnitKo - rental property management
//!
//! Headless entry point: opens the local directory, gates the landlord
//! dashboard and keeps the session fresh until interrupted.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use unitko_app::state::AppState;
use unitko_app::viewmodel::{
    GateState, LandlordGate, LogNavigator, LoginController, Navigator, PropertyManager,
};
use unitko_core::config::MAX_REFRESH_WINDOW_MINUTES;
use unitko_core::AppConfig;

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}

fn spawn_session_refresh(state: Arc<AppState>) {
    let minutes = state
        .config
        .refresh_window_minutes
        .clamp(1, MAX_REFRESH_WINDOW_MINUTES);
    let period = Duration::from_secs(minutes as u64 * 60);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            match state
                .with_identity(|identity| identity.refresh_session())
                .await
            {
                Ok(Some(_)) => tracing::debug!("Session refreshed"),
                Ok(None) => tracing::debug!("No live session to refresh"),
                Err(e) => tracing::warn!(error = %e, "Session refresh failed"),
            }
        }
    });
}

#[tokio::main]
async fn main() {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_tracing(&config.log_filter);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Invalid configuration, using defaults");
    }
    tracing::info!("Starting UnitKo");

    let state = match AppState::new(config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let navigator: Arc<dyn Navigator> = Arc::new(LogNavigator);
    let subscription = state.identity.subscribe();
    let mut login = LoginController::new(state.clone(), navigator.clone());
    spawn_session_refresh(state.clone());

    let mut gate = LandlordGate::new(state.clone(), navigator);
    if gate.mount().await == GateState::Authenticated {
        match PropertyManager::new(state.clone()).dashboard_summary().await {
            Ok(summary) => tracing::info!(
                properties = summary.total_properties,
                occupied = summary.occupied,
                vacant = summary.vacant,
                rent_roll = %summary.monthly_rent_roll,
                "Dashboard ready"
            ),
            Err(e) => tracing::warn!(error = %e, "Failed to load dashboard"),
        }
    } else {
        login.mount().await;
    }

    tokio::select! {
        _ = login.run(subscription) => {}
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down"),
    }
}
