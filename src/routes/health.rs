//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: String,
    pub dashboards: usize,
}

/// Liveness probe: always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe: checks database connectivity and reports how many
/// dashboards are subscribed.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let (code, status, database) = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (StatusCode::OK, "ok", "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", format!("error: {e}"))
        }
    };

    (
        code,
        Json(HealthStatus {
            status,
            database,
            dashboards: state.hub.client_count().await,
        }),
    )
}
