//! Study plan endpoints.
//!
//! All routes are per user. The connection lock is held for the whole
//! request, so fetch-or-generate cannot interleave with another request.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiJson, ApiQuery};
use crate::auth::AuthContext;
use crate::config::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use crate::db::try_lock;
use crate::domain::{StudyPlan, TopicRef};
use crate::services::StudyPlanService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
  pub success: bool,
  pub study_plan: StudyPlan,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPlanResponse {
  pub success: bool,
  pub study_plan: StudyPlan,
  /// Whole minutes until the plan is regenerated on read
  pub refreshes_in: i64,
  pub auto_refresh_enabled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
  pub success: bool,
  pub study_plan: StudyPlan,
  pub message: String,
}

/// POST /api/study-plan/generate
pub async fn generate(
  auth: AuthContext,
  State(state): State<AppState>,
) -> Result<Json<PlanResponse>, ApiError> {
  let conn = try_lock(&state.db)?;
  let plan = StudyPlanService::new(&conn).generate(auth.user_id)?;

  Ok(Json(PlanResponse {
    success: true,
    study_plan: plan,
  }))
}

/// GET /api/study-plan/current - Stored plan, regenerated if missing or stale
pub async fn current(
  auth: AuthContext,
  State(state): State<AppState>,
) -> Result<Json<CurrentPlanResponse>, ApiError> {
  let now = Utc::now();
  let conn = try_lock(&state.db)?;
  let current = StudyPlanService::at(&conn, now).current(auth.user_id)?;

  Ok(Json(CurrentPlanResponse {
    success: true,
    refreshes_in: current.plan.minutes_until_refresh(now),
    study_plan: current.plan,
    auto_refresh_enabled: true,
  }))
}

/// POST /api/study-plan/refresh - Regenerate regardless of age
pub async fn refresh(
  auth: AuthContext,
  State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, ApiError> {
  let conn = try_lock(&state.db)?;
  let plan = StudyPlanService::new(&conn).refresh(auth.user_id)?;

  Ok(Json(RefreshResponse {
    success: true,
    study_plan: plan,
    message: "Study plan refreshed with latest performance data".to_string(),
  }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTopicRequest {
  pub plan_id: i64,
  pub subject_index: Option<i64>,
  pub topic_index: Option<i64>,
  pub topic_id: Option<String>,
}

impl CompleteTopicRequest {
  /// `topicId` wins over the index pair. Negative indices never match a topic.
  fn target(&self) -> Option<TopicRef> {
    if let Some(id) = &self.topic_id {
      return Some(TopicRef::Id(id.clone()));
    }
    match (self.subject_index, self.topic_index) {
      (Some(subject), Some(topic)) => Some(TopicRef::Index {
        subject: usize::try_from(subject).unwrap_or(usize::MAX),
        topic: usize::try_from(topic).unwrap_or(usize::MAX),
      }),
      _ => None,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct CompleteTopicResponse {
  pub success: bool,
  pub plan: StudyPlan,
}

/// PUT /api/study-plan/complete-topic
pub async fn complete_topic(
  auth: AuthContext,
  State(state): State<AppState>,
  ApiJson(request): ApiJson<CompleteTopicRequest>,
) -> Result<Json<CompleteTopicResponse>, ApiError> {
  let target = request.target().ok_or_else(|| {
    ApiError::BadRequest("Provide topicId or both subjectIndex and topicIndex".to_string())
  })?;

  let conn = try_lock(&state.db)?;
  let plan = StudyPlanService::new(&conn).complete_topic(auth.user_id, request.plan_id, &target)?;

  Ok(Json(CompleteTopicResponse {
    success: true,
    plan,
  }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsView {
  pub learning_rate: String,
  pub retention_score: String,
  pub consistency_score: String,
  pub overall_score: String,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
  pub success: bool,
  pub metrics: MetricsView,
}

/// Fraction in [0, 1] as a one-decimal percentage string
fn percent_string(value: f64) -> String {
  format!("{:.1}", value * 100.0)
}

/// GET /api/study-plan/ai-metrics - Live estimate, not read from the stored plan
pub async fn ai_metrics(
  auth: AuthContext,
  State(state): State<AppState>,
) -> Result<Json<MetricsResponse>, ApiError> {
  let conn = try_lock(&state.db)?;
  let estimate = StudyPlanService::new(&conn).estimate_metrics(auth.user_id)?;

  Ok(Json(MetricsResponse {
    success: true,
    metrics: MetricsView {
      learning_rate: percent_string(estimate.learning_rate),
      retention_score: percent_string(estimate.retention_score),
      consistency_score: percent_string(estimate.consistency_score),
      overall_score: percent_string(estimate.overall_score()),
    },
  }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
  pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
  pub success: bool,
  pub plans: Vec<StudyPlan>,
}

/// GET /api/study-plan/history?limit=N - Most recent plans, newest first
pub async fn history(
  auth: AuthContext,
  State(state): State<AppState>,
  ApiQuery(query): ApiQuery<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
  let limit = query
    .limit
    .unwrap_or(DEFAULT_HISTORY_LIMIT)
    .clamp(1, MAX_HISTORY_LIMIT);

  let conn = try_lock(&state.db)?;
  let plans = StudyPlanService::new(&conn).history(auth.user_id, limit)?;

  Ok(Json(HistoryResponse {
    success: true,
    plans,
  }))
}
