//! Cookie session authentication for Axum handlers.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::AccountType;
use crate::services::auth as auth_service;
use crate::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Session cookie holding a freshly issued token.
pub fn session_cookie(token: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Removal cookie matching the attributes of [`session_cookie`].
pub fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Authenticated user extracted from the session cookie.
///
/// Use as an Axum extractor in handlers that require authentication:
/// ```ignore
/// async fn handler(current_user: CurrentUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: AccountType,
}

impl CurrentUser {
    fn from_token(token: &str, jwt_secret: &str) -> Result<Self, AppError> {
        let claims = auth_service::validate_token(token, jwt_secret)?;
        let id: Uuid = claims.sub.parse().map_err(|_| AppError::Unauthorized)?;
        Ok(CurrentUser {
            id,
            role: claims.role,
        })
    }

    /// Resolve the session cookie: `Ok(None)` when absent, `Err` when present
    /// but invalid or expired.
    pub fn from_jar(jar: &CookieJar, jwt_secret: &str) -> Result<Option<Self>, AppError> {
        jar.get(SESSION_COOKIE)
            .map(|cookie| Self::from_token(cookie.value(), jwt_secret))
            .transpose()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Self::from_jar(&jar, &state.config.jwt_secret)?.ok_or(AppError::Unauthorized)
    }
}

/// Verify the session cookie on every request. Anonymous requests pass
/// through; a present but invalid token is rejected before any handler runs.
pub async fn verify_session(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if let Err(e) = CurrentUser::from_jar(&jar, &state.config.jwt_secret) {
        tracing::debug!(path = %request.uri().path(), "Rejected invalid session cookie");
        // Drop the stale cookie so the next request is anonymous.
        return (jar.remove(cleared_session_cookie()), e).into_response();
    }
    next.run(request).await
}
