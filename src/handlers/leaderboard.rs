use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiQuery};
use crate::auth::AuthContext;
use crate::config::{
    DEFAULT_LEADERBOARD_DAYS, DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT, MAX_QUERY_DAYS,
};
use crate::db::{self, try_lock, LeaderboardEntry};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub days: Option<i64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub success: bool,
    pub entries: Vec<LeaderboardEntry>,
}

/// GET /api/leaderboard?days=N&limit=M
pub async fn leaderboard(
    _auth: AuthContext,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let days = query
        .days
        .unwrap_or(DEFAULT_LEADERBOARD_DAYS)
        .clamp(1, MAX_QUERY_DAYS);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT);

    let conn = try_lock(&state.db)?;
    let entries = db::get_leaderboard(&conn, Utc::now() - Duration::days(days), limit)?;

    Ok(Json(LeaderboardResponse {
        success: true,
        entries,
    }))
}
