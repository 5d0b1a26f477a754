//! Public hospital picker.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::models::hospital::HospitalRanking;
use crate::services::hospital as hospital_service;
use crate::AppState;

/// GET /hospitals: hospitals ranked by spare capacity (`beds - waiting`).
pub async fn ranked(
    State(state): State<AppState>,
) -> Result<Json<Vec<HospitalRanking>>, AppError> {
    let hospitals = hospital_service::ranked(&state.db).await?;
    Ok(Json(hospitals))
}
