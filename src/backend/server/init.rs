/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including store loading, state creation and route configuration.
 *
 * # Initialization Process
 *
 * 1. Open the persistence backend (PostgreSQL or in-memory)
 * 2. Wire the chat core into an `AppState`
 * 3. Create and configure the router
 * 4. Start the periodic cleanup task
 */

use axum::Router;
use std::time::Duration;

use crate::backend::error::StoreError;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_store;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Create and configure the Axum application
///
/// # Errors
///
/// Fails when a configured database cannot be reached or migrated.
pub async fn create_app(config: AppConfig) -> Result<Router<()>, StoreError> {
    tracing::info!("Initializing xfchat backend server");

    let store = load_store(&config).await?;
    let app_state = AppState::new(config, store);

    let app = create_router(app_state.clone());
    spawn_cleanup_task(app_state);

    tracing::info!("Router configured with periodic cleanup task");
    Ok(app)
}

/// Periodically drop idle broadcast channels and idle entity locks
pub fn spawn_cleanup_task(app_state: AppState) -> tokio::task::JoinHandle<()> {
    let period = Duration::from_secs(app_state.config.cleanup_interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let (channels, locks) = app_state.cleanup();
            tracing::debug!(
                "[Realtime] Cleanup removed {} idle channels and {} idle locks",
                channels,
                locks
            );
        }
    })
}
