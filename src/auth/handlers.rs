//! Register, login and logout endpoints.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};

use super::db as auth_db;
use super::middleware::{session_token, SESSION_COOKIE_NAME};
use super::password::{hash_password, verify_password};
use crate::config::SESSION_DURATION_HOURS;
use crate::db::{try_lock, LogOnError};
use crate::handlers::{ApiError, ApiJson};
use crate::session::generate_session_id;
use crate::state::AppState;
use crate::validation::{validate_password, validate_username};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub username: String,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(false) // Set to true in production with HTTPS
        .max_age(time::Duration::hours(SESSION_DURATION_HOURS))
        .build()
}

/// POST /api/auth/register - Create an account and start a session
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(form): ApiJson<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let username = form.username.trim().to_string();
    validate_username(&username).map_err(ApiError::BadRequest)?;
    validate_password(&form.password).map_err(ApiError::BadRequest)?;

    // Hash before taking the database lock
    let password_hash = hash_password(&form.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::Internal
    })?;

    let token = generate_session_id();
    let conn = try_lock(&state.db)?;

    if auth_db::username_exists(&conn, &username)? {
        return Err(ApiError::Conflict("Username already taken".to_string()));
    }

    // The existence check is only a fast path; the UNIQUE index decides
    let user_id = match auth_db::create_user(&conn, &username, &password_hash) {
        Ok(id) => id,
        Err(e) if auth_db::is_unique_violation(&e) => {
            return Err(ApiError::Conflict("Username already taken".to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    auth_db::create_session(&conn, user_id, &token, SESSION_DURATION_HOURS)?;
    drop(conn);

    tracing::info!("Registered user {} ({})", username, user_id);

    let body = AuthResponse {
        success: true,
        token: token.clone(),
        username,
    };
    Ok((StatusCode::CREATED, jar.add(session_cookie(token)), Json(body)))
}

/// POST /api/auth/login - Verify credentials and start a session
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(form): ApiJson<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let stored = {
        let conn = try_lock(&state.db)?;
        auth_db::get_user_by_username(&conn, form.username.trim())?
    };

    let Some((user_id, username, password_hash)) = stored else {
        tracing::debug!("Login failed: unknown user {}", form.username);
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&form.password, &password_hash) {
        tracing::debug!("Login failed: wrong password for {}", username);
        return Err(ApiError::InvalidCredentials);
    }

    let token = generate_session_id();
    {
        let conn = try_lock(&state.db)?;
        auth_db::create_session(&conn, user_id, &token, SESSION_DURATION_HOURS)?;
        auth_db::update_last_login(&conn, user_id).log_warn("Failed to update last login");
    }

    let body = AuthResponse {
        success: true,
        token: token.clone(),
        username,
    };
    Ok((jar.add(session_cookie(token)), Json(body)))
}

/// POST /api/auth/logout - Delete the session and clear the cookie
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session_token(&headers) {
        let conn = try_lock(&state.db)?;
        auth_db::delete_session(&conn, &token).log_warn("Failed to delete session during logout");
    }

    let removal = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .build();

    Ok((jar.remove(removal), Json(serde_json::json!({ "success": true }))))
}
