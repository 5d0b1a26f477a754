//! Hospital point-of-contact routes: review queue, accept, reject, certify.

use axum::{
    extract::State,
    Json,
};
use uuid::Uuid;

use crate::errors::{AppError, MessageResponse};
use crate::middleware::extract::AppPath;
use crate::middleware::rbac::HospitalPoc;
use crate::models::donation::ReviewDecision;
use crate::services::donation::{self as donation_service, HospitalQueue, TransitionOutcome};
use crate::AppState;

/// GET /hospital/donors: donations awaiting review or a certificate.
pub async fn donors(
    State(state): State<AppState>,
    poc: HospitalPoc,
) -> Result<Json<HospitalQueue>, AppError> {
    let queue = donation_service::queue_for_hospital(&state.db, poc.hospital.id).await?;
    Ok(Json(queue))
}

/// POST /hospital/accept/{id}
pub async fn accept(
    State(state): State<AppState>,
    poc: HospitalPoc,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    review(state, poc, id, ReviewDecision::Accept).await
}

/// POST /hospital/reject/{id}
pub async fn reject(
    State(state): State<AppState>,
    poc: HospitalPoc,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    review(state, poc, id, ReviewDecision::Reject).await
}

/// POST /hospital/certificate/{id}: idempotent after the first issue.
pub async fn certificate(
    State(state): State<AppState>,
    poc: HospitalPoc,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let outcome = donation_service::issue_certificate(&state.db, id, poc.hospital.id).await?;
    broadcast_if_applied(&state, outcome).await;
    Ok(MessageResponse::new("Certificate issued"))
}

async fn review(
    state: AppState,
    poc: HospitalPoc,
    id: Uuid,
    decision: ReviewDecision,
) -> Result<Json<MessageResponse>, AppError> {
    let outcome = donation_service::review(&state.db, id, poc.hospital.id, decision).await?;
    broadcast_if_applied(&state, outcome).await;
    Ok(MessageResponse::new(decision.message()))
}

async fn broadcast_if_applied(state: &AppState, outcome: TransitionOutcome) {
    if outcome.is_applied() {
        state.notify_stats_changed().await;
    }
}
