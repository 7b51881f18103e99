//! Per-subject aggregation of recent quiz attempts.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

use crate::domain::{accuracy_percent, PerformanceSummary, QuizAttempt, SubjectPerformance};

/// Trailing window of attempts considered for subject performance
pub const PERFORMANCE_WINDOW_DAYS: i64 = 7;

/// Subjects at or above this accuracy are strengths
pub const STRENGTH_THRESHOLD: f64 = 80.0;

/// Subjects below this accuracy are weaknesses
pub const WEAKNESS_THRESHOLD: f64 = 60.0;

/// Earliest timestamp that still counts towards subject performance
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
  now - Duration::days(PERFORMANCE_WINDOW_DAYS)
}

/// Group attempts by subject and compute accuracy from summed scores.
///
/// The caller is responsible for windowing; every attempt passed in counts.
/// Subjects come out in alphabetical order. Totals saturate instead of
/// overflowing.
pub fn aggregate(attempts: &[QuizAttempt]) -> PerformanceSummary {
  let mut buckets: BTreeMap<&str, (i64, i64, usize)> = BTreeMap::new();
  for attempt in attempts {
    let entry = buckets.entry(attempt.subject.as_str()).or_insert((0, 0, 0));
    entry.0 = entry.0.saturating_add(attempt.score);
    entry.1 = entry.1.saturating_add(attempt.total_questions);
    entry.2 += 1;
  }

  let subjects: Vec<SubjectPerformance> = buckets
    .into_iter()
    .map(|(subject, (total_score, total_questions, count))| SubjectPerformance {
      subject: subject.to_string(),
      total_score,
      total_questions,
      attempts: count,
      accuracy: accuracy_percent(total_score, total_questions),
    })
    .collect();

  let strengths = subjects
    .iter()
    .filter(|s| s.accuracy >= STRENGTH_THRESHOLD)
    .map(|s| s.subject.clone())
    .collect();
  let weaknesses = subjects
    .iter()
    .filter(|s| s.accuracy < WEAKNESS_THRESHOLD)
    .map(|s| s.subject.clone())
    .collect();

  let score_sum = subjects
    .iter()
    .fold(0i64, |acc, s| acc.saturating_add(s.total_score));
  let question_sum = subjects
    .iter()
    .fold(0i64, |acc, s| acc.saturating_add(s.total_questions));

  PerformanceSummary {
    overall_accuracy: accuracy_percent(score_sum, question_sum),
    total_attempts: attempts.len(),
    subjects,
    strengths,
    weaknesses,
  }
}
