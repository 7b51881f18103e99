//! Quiz attempt recording and listing.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiJson, ApiQuery};
use crate::auth::AuthContext;
use crate::config::{DEFAULT_ATTEMPT_DAYS, MAX_QUERY_DAYS};
use crate::db::{self, try_lock};
use crate::domain::QuizAttempt;
use crate::state::AppState;
use crate::validation::{validate_accuracy, validate_score, validate_subject, validate_timestamp};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttemptRequest {
    pub subject: String,
    pub score: i64,
    pub total_questions: i64,
    /// Derived from score when omitted
    pub accuracy: Option<f64>,
    /// Defaults to now; future times beyond a small skew are rejected
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub success: bool,
    pub attempt: QuizAttempt,
}

/// POST /api/quiz-attempts
pub async fn record(
    auth: AuthContext,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RecordAttemptRequest>,
) -> Result<(StatusCode, Json<AttemptResponse>), ApiError> {
    let subject = validate_subject(&request.subject).map_err(ApiError::BadRequest)?;
    validate_score(request.score, request.total_questions).map_err(ApiError::BadRequest)?;
    validate_accuracy(request.accuracy).map_err(ApiError::BadRequest)?;
    let now = Utc::now();
    let timestamp = request.timestamp.unwrap_or(now);
    validate_timestamp(timestamp, now).map_err(ApiError::BadRequest)?;

    let mut attempt = QuizAttempt::new(
        auth.user_id,
        subject,
        request.score,
        request.total_questions,
        request.accuracy,
        timestamp,
    );

    let conn = try_lock(&state.db)?;
    attempt.id = db::insert_attempt(&conn, &attempt)?;

    tracing::debug!(
        "Recorded attempt {} for user {}: {} {}/{}",
        attempt.id,
        auth.user_id,
        attempt.subject,
        attempt.score,
        attempt.total_questions
    );

    Ok((
        StatusCode::CREATED,
        Json(AttemptResponse {
            success: true,
            attempt,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListAttemptsQuery {
    pub days: Option<i64>,
    pub subject: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AttemptsResponse {
    pub success: bool,
    pub attempts: Vec<QuizAttempt>,
}

/// GET /api/quiz-attempts?days=N&subject=S - Newest first
pub async fn list(
    auth: AuthContext,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListAttemptsQuery>,
) -> Result<Json<AttemptsResponse>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_ATTEMPT_DAYS).clamp(1, MAX_QUERY_DAYS);
    let subject = query
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let since = Utc::now() - Duration::days(days);
    let conn = try_lock(&state.db)?;
    let attempts = db::get_attempts_since(&conn, auth.user_id, since, subject)?;

    Ok(Json(AttemptsResponse {
        success: true,
        attempts,
    }))
}
