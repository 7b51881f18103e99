//! Router construction, shared by the binary and the HTTP tests.

use axum::{
  routing::{get, post, put},
  Router,
};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::handlers::{self, attempts, leaderboard, study_plan};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(handlers::health))
    // Auth
    .route("/api/auth/register", post(auth::handlers::register))
    .route("/api/auth/login", post(auth::handlers::login))
    .route("/api/auth/logout", post(auth::handlers::logout))
    // Study plan
    .route("/api/study-plan/generate", post(study_plan::generate))
    .route("/api/study-plan/current", get(study_plan::current))
    .route("/api/study-plan/refresh", post(study_plan::refresh))
    .route("/api/study-plan/complete-topic", put(study_plan::complete_topic))
    .route("/api/study-plan/ai-metrics", get(study_plan::ai_metrics))
    .route("/api/study-plan/history", get(study_plan::history))
    // Quiz history
    .route(
      "/api/quiz-attempts",
      get(attempts::list).post(attempts::record),
    )
    .route("/api/leaderboard", get(leaderboard::leaderboard))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
