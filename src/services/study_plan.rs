//! Study plan generation and refresh control.
//!
//! `StudyPlanService` is built per request over a borrowed connection. It
//! reads quiz history, runs the planner pipeline and persists the result.
//! Plans are never rewritten by a regeneration; a new row is inserted and
//! becomes the current plan.

use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;

use crate::config;
use crate::db;
use crate::domain::{StudyPlan, TopicRef};
use crate::planner::metrics::{
    CONSISTENCY_WINDOW_DAYS, LEARNING_RATE_SAMPLE, RETENTION_OLDER_DAYS,
};
use crate::planner::{self, performance, MetricsEstimate};

/// Failure while producing or updating a plan
#[derive(Debug)]
pub enum PlanError {
    /// Query or write failed; the whole operation is aborted
    Database(rusqlite::Error),
    /// No plan with this id belongs to the caller
    PlanNotFound(i64),
}

impl std::fmt::Display for PlanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database(e) => write!(f, "database error: {}", e),
            Self::PlanNotFound(id) => write!(f, "study plan {} not found", id),
        }
    }
}

impl std::error::Error for PlanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            Self::PlanNotFound(_) => None,
        }
    }
}

impl From<rusqlite::Error> for PlanError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e)
    }
}

/// Result of a fetch-or-generate lookup
#[derive(Debug, Clone)]
pub struct CurrentPlan {
    pub plan: StudyPlan,
    /// True when the stored plan was missing or stale and a new one was made
    pub generated: bool,
}

pub struct StudyPlanService<'a> {
    conn: &'a Connection,
    now: DateTime<Utc>,
}

impl<'a> StudyPlanService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self::at(conn, Utc::now())
    }

    /// Service pinned to a fixed clock
    pub fn at(conn: &'a Connection, now: DateTime<Utc>) -> Self {
        Self { conn, now }
    }

    /// Learning rate, retention and consistency from live quiz history
    pub fn estimate_metrics(&self, user_id: i64) -> Result<MetricsEstimate, PlanError> {
        let recent = db::get_recent_attempts(self.conn, user_id, LEARNING_RATE_SAMPLE)?;
        let fortnight = db::get_attempts_since(
            self.conn,
            user_id,
            self.now - Duration::days(RETENTION_OLDER_DAYS),
            None,
        )?;
        let month = db::get_attempts_since(
            self.conn,
            user_id,
            self.now - Duration::days(CONSISTENCY_WINDOW_DAYS),
            None,
        )?;

        Ok(MetricsEstimate {
            learning_rate: planner::learning_rate(&recent),
            retention_score: planner::retention_score(&fortnight, self.now),
            consistency_score: planner::consistency_score(&month, self.now),
        })
    }

    /// Build and store a new plan regardless of the current one's age
    pub fn generate(&self, user_id: i64) -> Result<StudyPlan, PlanError> {
        let window = db::get_attempts_since(
            self.conn,
            user_id,
            performance::window_start(self.now),
            None,
        )?;
        let summary = planner::aggregate(&window);
        let metrics = self.estimate_metrics(user_id)?;
        let draft = planner::synthesize(summary, &metrics);
        let version = db::get_latest_version(self.conn, user_id)? + 1;

        let mut plan = StudyPlan {
            id: 0,
            user_id,
            subjects: draft.subjects,
            performance: draft.performance,
            recommendations: draft.recommendations,
            study_goals: draft.study_goals,
            ai_metrics: draft.ai_metrics,
            total_study_time: draft.total_study_time,
            completion_status: 0,
            version,
            created_at: self.now,
            last_updated: self.now,
            next_refresh_time: self.now + Duration::hours(config::PLAN_REFRESH_HOURS),
        };
        plan.id = db::insert_plan(self.conn, &plan)?;

        tracing::info!(
            "Generated study plan {} (v{}) for user {}: {} subjects, {} min/day, level {}",
            plan.id,
            plan.version,
            user_id,
            plan.subjects.len(),
            plan.total_study_time,
            plan.ai_metrics.adaptive_level.as_str()
        );
        Ok(plan)
    }

    /// Latest plan, regenerated first if missing or past its refresh time
    pub fn current(&self, user_id: i64) -> Result<CurrentPlan, PlanError> {
        match db::get_latest_plan(self.conn, user_id)? {
            Some(plan) if !plan.is_stale(self.now) => Ok(CurrentPlan {
                plan,
                generated: false,
            }),
            Some(plan) => {
                tracing::debug!(
                    "Plan {} for user {} expired at {}, regenerating",
                    plan.id,
                    user_id,
                    plan.next_refresh_time
                );
                self.generate(user_id).map(|plan| CurrentPlan {
                    plan,
                    generated: true,
                })
            }
            None => {
                tracing::debug!("No plan for user {}, generating first one", user_id);
                self.generate(user_id).map(|plan| CurrentPlan {
                    plan,
                    generated: true,
                })
            }
        }
    }

    /// Forced regeneration
    pub fn refresh(&self, user_id: i64) -> Result<StudyPlan, PlanError> {
        tracing::debug!("Forced plan refresh for user {}", user_id);
        self.generate(user_id)
    }

    /// Mark one topic complete and recompute the plan's completion status.
    ///
    /// A target that matches no topic leaves the plan untouched.
    pub fn complete_topic(
        &self,
        user_id: i64,
        plan_id: i64,
        target: &TopicRef,
    ) -> Result<StudyPlan, PlanError> {
        let mut plan = db::get_user_plan(self.conn, user_id, plan_id)?
            .ok_or(PlanError::PlanNotFound(plan_id))?;

        match plan.topic_mut(target) {
            None => {
                tracing::debug!("Topic {:?} not in plan {}, ignoring", target, plan_id);
                return Ok(plan);
            }
            Some(topic) if topic.completed => return Ok(plan),
            Some(topic) => {
                topic.completed = true;
                topic.completed_at = Some(self.now);
            }
        }

        plan.recompute_completion();
        plan.last_updated = self.now;
        db::update_plan_progress(self.conn, &plan)?;
        Ok(plan)
    }

    pub fn history(&self, user_id: i64, limit: usize) -> Result<Vec<StudyPlan>, PlanError> {
        Ok(db::get_plan_history(self.conn, user_id, limit)?)
    }
}
