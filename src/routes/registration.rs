//! Public donor registration.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::middleware::extract::AppJson;
use crate::services::donation::{self as donation_service, RegistrationRequest};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub success: bool,
    pub message: String,
}

/// POST /registration: record a pending donation at the chosen hospital.
pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegistrationRequest>,
) -> Result<Json<RegistrationResponse>, AppError> {
    donation_service::register(&state.db, &body).await?;
    state.notify_stats_changed().await;

    Ok(Json(RegistrationResponse {
        success: true,
        message: "Registration recorded successfully!".to_string(),
    }))
}
