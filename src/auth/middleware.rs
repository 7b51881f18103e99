//! Authentication extractor.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;

use super::db as auth_db;
use crate::db::try_lock;
use crate::handlers::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "jee_session";

/// Authenticated request context.
/// Add this as a handler parameter to require authentication.
/// Rejects with 401 if no valid session token is presented.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
}

/// Session token from `Authorization: Bearer`, falling back to the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string())
    })
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(ApiError::Unauthorized)?;

        let conn = try_lock(&state.db)?;
        let (user_id, username) = auth_db::get_session_user(&conn, &token)?
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthContext { user_id, username })
    }
}
