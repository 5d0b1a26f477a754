//! Admin CRUD routes for users, donors, donations, and hospitals.
//!
//! Donation, donor, and hospital writes push a fresh stats snapshot once
//! they succeed; user writes do not affect the dashboard.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, MessageResponse};
use crate::middleware::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireAdmin;
use crate::models::donation::{CreateDonation, DonationDetails, UpdateDonation};
use crate::models::donor::{CreateDonor, Donor, UpdateDonor};
use crate::models::hospital::{CreateHospital, Hospital, UpdateHospital};
use crate::models::user::{CreateUser, UpdateUser, UserResponse};
use crate::services::{
    donation as donation_service, donor as donor_service, hospital as hospital_service,
    user as user_service,
};
use crate::AppState;

// ---------------------------------------------------------------- users

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = user_service::list(&state.db).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service::find_by_id(&state.db, id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// POST /admin/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppJson(body): AppJson<CreateUser>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    body.validate()?;
    let user = user_service::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// PUT /admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateUser>,
) -> Result<Json<UserResponse>, AppError> {
    body.validate()?;
    let user = user_service::update(&state.db, id, &body).await?;
    Ok(Json(UserResponse::from(user)))
}

/// DELETE /admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if admin.id == id {
        return Err(AppError::Validation(
            "Admins cannot delete their own account".to_string(),
        ));
    }
    user_service::delete(&state.db, id).await?;
    Ok(MessageResponse::new("User deleted successfully"))
}

// --------------------------------------------------------------- donors

/// GET /admin/donors
pub async fn list_donors(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Donor>>, AppError> {
    Ok(Json(donor_service::list(&state.db).await?))
}

/// GET /admin/donors/{id}
pub async fn get_donor(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Donor>, AppError> {
    Ok(Json(donor_service::find_by_id(&state.db, id).await?))
}

/// POST /admin/donors: a donor without donations does not change stats.
pub async fn create_donor(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppJson(body): AppJson<CreateDonor>,
) -> Result<(StatusCode, Json<Donor>), AppError> {
    body.validate()?;
    let donor = donor_service::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(donor)))
}

/// PUT /admin/donors/{id}
pub async fn update_donor(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateDonor>,
) -> Result<Json<Donor>, AppError> {
    body.validate()?;
    let donor = donor_service::update(&state.db, id, &body).await?;
    state.notify_stats_changed().await;
    Ok(Json(donor))
}

/// DELETE /admin/donors/{id}
pub async fn delete_donor(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    donor_service::delete(&state.db, id).await?;
    state.notify_stats_changed().await;
    Ok(MessageResponse::new("Donor deleted successfully"))
}

// ------------------------------------------------------------ donations

/// GET /admin/donations
pub async fn list_donations(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<DonationDetails>>, AppError> {
    Ok(Json(donation_service::list(&state.db).await?))
}

/// GET /admin/donations/{id}
pub async fn get_donation(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<DonationDetails>, AppError> {
    Ok(Json(donation_service::find_details(&state.db, id).await?))
}

/// POST /admin/donations
pub async fn create_donation(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppJson(body): AppJson<CreateDonation>,
) -> Result<(StatusCode, Json<DonationDetails>), AppError> {
    let donation = donation_service::create(&state.db, &body).await?;
    state.notify_stats_changed().await;
    Ok((StatusCode::CREATED, Json(donation)))
}

/// PUT /admin/donations/{id}
pub async fn update_donation(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateDonation>,
) -> Result<Json<DonationDetails>, AppError> {
    let donation = donation_service::update(&state.db, id, &body).await?;
    state.notify_stats_changed().await;
    Ok(Json(donation))
}

/// DELETE /admin/donations/{id}
pub async fn delete_donation(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    donation_service::delete(&state.db, id).await?;
    state.notify_stats_changed().await;
    Ok(MessageResponse::new("Donation deleted successfully"))
}

// ------------------------------------------------------------ hospitals

/// GET /admin/hospitals
pub async fn list_hospitals(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Hospital>>, AppError> {
    Ok(Json(hospital_service::list(&state.db).await?))
}

/// GET /admin/hospitals/{id}
pub async fn get_hospital(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Hospital>, AppError> {
    Ok(Json(hospital_service::find_by_id(&state.db, id).await?))
}

/// POST /admin/hospitals
pub async fn create_hospital(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppJson(body): AppJson<CreateHospital>,
) -> Result<(StatusCode, Json<Hospital>), AppError> {
    body.validate()?;
    let hospital = hospital_service::create(&state.db, &body).await?;
    state.notify_stats_changed().await;
    Ok((StatusCode::CREATED, Json(hospital)))
}

/// PUT /admin/hospitals/{id}
pub async fn update_hospital(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateHospital>,
) -> Result<Json<Hospital>, AppError> {
    body.validate()?;
    let hospital = hospital_service::update(&state.db, id, &body).await?;
    state.notify_stats_changed().await;
    Ok(Json(hospital))
}

/// DELETE /admin/hospitals/{id}
pub async fn delete_hospital(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    hospital_service::delete(&state.db, id).await?;
    state.notify_stats_changed().await;
    Ok(MessageResponse::new("Hospital deleted successfully"))
}
