pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use sqlx::PgPool;

use crate::services::broadcast::StatsHub;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: config::AppConfig,
    pub hub: StatsHub,
}

impl AppState {
    pub fn new(db: PgPool, config: config::AppConfig) -> Self {
        Self {
            db,
            config,
            hub: StatsHub::new(),
        }
    }

    /// Push fresh stats to every dashboard. Call once after each successful
    /// mutation of donation, donor, or hospital state.
    pub async fn notify_stats_changed(&self) {
        self.hub.broadcast_update(&self.db).await;
    }
}
