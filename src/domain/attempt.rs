use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded quiz result. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
  pub id: i64,
  pub user_id: i64,
  pub subject: String,
  /// Number of correctly answered questions
  pub score: i64,
  pub total_questions: i64,
  /// Percentage in [0, 100]
  pub accuracy: f64,
  pub timestamp: DateTime<Utc>,
}

impl QuizAttempt {
  /// Build an unsaved attempt, deriving accuracy from score when not supplied
  pub fn new(
    user_id: i64,
    subject: impl Into<String>,
    score: i64,
    total_questions: i64,
    accuracy: Option<f64>,
    timestamp: DateTime<Utc>,
  ) -> Self {
    let accuracy = accuracy.unwrap_or_else(|| accuracy_percent(score, total_questions));
    Self {
      id: 0,
      user_id,
      subject: subject.into(),
      score,
      total_questions,
      accuracy,
      timestamp,
    }
  }
}

/// score / total × 100, or 0 when there were no questions
pub fn accuracy_percent(score: i64, total_questions: i64) -> f64 {
  if total_questions > 0 {
    score as f64 * 100.0 / total_questions as f64
  } else {
    0.0
  }
}
