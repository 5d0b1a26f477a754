//! Authentication routes: login and logout.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::extract::AppJson;
use crate::middleware::auth::{cleared_session_cookie, session_cookie};
use crate::services::auth as auth_service;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub redirect_url: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// POST /login: verify credentials and set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    body.validate()?;

    let (user, token) = auth_service::login(
        &state.db,
        body.email.trim(),
        &body.password,
        &state.config.jwt_secret,
        state.config.jwt_expiry_secs,
    )
    .await?;

    let jar = jar.add(session_cookie(
        token,
        state.config.jwt_expiry_secs,
        state.config.cookie_secure,
    ));

    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            redirect_url: user.account_type.redirect_url().to_string(),
        }),
    ))
}

/// POST /logout: drop the session cookie (tokens are stateless).
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    (
        jar.remove(cleared_session_cookie()),
        Json(LogoutResponse { success: true }),
    )
}
