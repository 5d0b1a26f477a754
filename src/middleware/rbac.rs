//! Role-based access control extractors for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::hospital::Hospital;
use crate::models::user::AccountType;
use crate::services::hospital as hospital_service;
use crate::AppState;

/// Extractor that requires the admin account type.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != AccountType::Admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(RequireAdmin(user))
    }
}

/// Extractor for hospital point-of-contact users, resolved to the hospital
/// they own. Donation-level ownership is checked by the service.
#[derive(Debug, Clone)]
pub struct HospitalPoc {
    pub user: CurrentUser,
    pub hospital: Hospital,
}

impl FromRequestParts<AppState> for HospitalPoc {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != AccountType::Hospital {
            return Err(AppError::Forbidden(
                "Hospital account access required".to_string(),
            ));
        }

        let hospital = hospital_service::find_by_owner(&state.db, user.id)
            .await?
            .ok_or_else(|| AppError::Forbidden("Hospital not linked to user".to_string()))?;

        Ok(HospitalPoc { user, hospital })
    }
}
