//! Scalar learning signals derived from quiz history.
//!
//! Each estimator falls back to a fixed neutral value when there is not
//! enough history to say anything.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;

use crate::domain::QuizAttempt;

/// Number of most recent attempts inspected for the learning rate
pub const LEARNING_RATE_SAMPLE: usize = 50;

/// Size of the rolling window compared step by step
pub const LEARNING_WINDOW: usize = 5;

pub const NEUTRAL_LEARNING_RATE: f64 = 0.5;

pub const RETENTION_RECENT_DAYS: i64 = 7;
pub const RETENTION_OLDER_DAYS: i64 = 14;
pub const RETENTION_HELD: f64 = 0.8;
pub const RETENTION_DROPPED: f64 = 0.4;
pub const NEUTRAL_RETENTION: f64 = 0.5;

pub const CONSISTENCY_WINDOW_DAYS: i64 = 30;
/// Active days per month that count as fully consistent (three weeks)
pub const CONSISTENCY_TARGET_DAYS: f64 = 21.0;
pub const CONSISTENCY_MIN_ATTEMPTS: usize = 5;
pub const LOW_CONSISTENCY: f64 = 0.3;

/// Tolerance for comparing window means computed from different sums
const MEAN_EPSILON: f64 = 1e-9;

/// The three learning signals, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsEstimate {
  pub learning_rate: f64,
  pub retention_score: f64,
  pub consistency_score: f64,
}

impl MetricsEstimate {
  /// Unweighted mean of the three signals
  pub fn overall_score(&self) -> f64 {
    (self.learning_rate + self.retention_score + self.consistency_score) / 3.0
  }
}

/// Fraction of rolling-window steps where mean accuracy went up.
///
/// Attempts may arrive in any order; only the latest [`LEARNING_RATE_SAMPLE`]
/// by timestamp are used.
pub fn learning_rate(attempts: &[QuizAttempt]) -> f64 {
  if attempts.len() < LEARNING_WINDOW {
    return NEUTRAL_LEARNING_RATE;
  }

  let mut chronological: Vec<&QuizAttempt> = attempts.iter().collect();
  chronological.sort_by_key(|a| a.timestamp);
  let start = chronological.len().saturating_sub(LEARNING_RATE_SAMPLE);
  let accuracies: Vec<f64> = chronological[start..].iter().map(|a| a.accuracy).collect();

  let window_means: Vec<f64> = accuracies.windows(LEARNING_WINDOW).map(mean).collect();
  let comparisons = window_means.len().saturating_sub(1);
  if comparisons == 0 {
    return NEUTRAL_LEARNING_RATE;
  }

  let improvements = window_means
    .windows(2)
    .filter(|pair| pair[1] - pair[0] > MEAN_EPSILON)
    .count();

  (improvements as f64 / comparisons as f64).clamp(0.0, 1.0)
}

/// Whether last week's accuracy held up against the week before.
pub fn retention_score(attempts: &[QuizAttempt], now: DateTime<Utc>) -> f64 {
  let recent_start = now - Duration::days(RETENTION_RECENT_DAYS);
  let older_start = now - Duration::days(RETENTION_OLDER_DAYS);

  let recent: Vec<f64> = attempts
    .iter()
    .filter(|a| a.timestamp >= recent_start)
    .map(|a| a.accuracy)
    .collect();
  let older: Vec<f64> = attempts
    .iter()
    .filter(|a| a.timestamp >= older_start && a.timestamp < recent_start)
    .map(|a| a.accuracy)
    .collect();

  if recent.is_empty() {
    return NEUTRAL_RETENTION;
  }
  if older.is_empty() || mean(&recent) >= mean(&older) {
    RETENTION_HELD
  } else {
    RETENTION_DROPPED
  }
}

/// Distinct active days in the last month relative to a 21-day target.
pub fn consistency_score(attempts: &[QuizAttempt], now: DateTime<Utc>) -> f64 {
  let window_start = now - Duration::days(CONSISTENCY_WINDOW_DAYS);
  let in_window: Vec<&QuizAttempt> = attempts
    .iter()
    .filter(|a| a.timestamp >= window_start)
    .collect();

  if in_window.len() < CONSISTENCY_MIN_ATTEMPTS {
    return LOW_CONSISTENCY;
  }

  let active_days: BTreeSet<_> = in_window.iter().map(|a| a.timestamp.date_naive()).collect();
  (active_days.len() as f64 / CONSISTENCY_TARGET_DAYS).min(1.0)
}

fn mean(values: &[f64]) -> f64 {
  if values.is_empty() {
    return 0.0;
  }
  values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
  use super::*;

  fn at(now: DateTime<Utc>, minutes_ago: i64, accuracy: f64) -> QuizAttempt {
    QuizAttempt::new(
      1,
      "Physics",
      0,
      10,
      Some(accuracy),
      now - Duration::minutes(minutes_ago),
    )
  }

  fn days_ago(now: DateTime<Utc>, days: i64, accuracy: f64) -> QuizAttempt {
    at(now, days * 24 * 60, accuracy)
  }

  // Learning rate

  #[test]
  fn test_learning_rate_neutral_below_five_attempts() {
    let now = Utc::now();
    for n in 0..5 {
      let attempts: Vec<_> = (0..n).map(|i| at(now, i as i64, 90.0)).collect();
      assert_eq!(learning_rate(&attempts), 0.5);
    }
  }

  #[test]
  fn test_learning_rate_neutral_with_exactly_one_window() {
    let now = Utc::now();
    let attempts: Vec<_> = (0..5).map(|i| at(now, 10 - i, i as f64 * 10.0)).collect();
    assert_eq!(learning_rate(&attempts), 0.5);
  }

  #[test]
  fn test_learning_rate_steady_improvement_is_one() {
    let now = Utc::now();
    // Oldest first: 10, 20, ... 100
    let attempts: Vec<_> = (0..10)
      .map(|i| at(now, 100 - i, 10.0 + i as f64 * 10.0))
      .collect();
    assert_eq!(learning_rate(&attempts), 1.0);
  }

  #[test]
  fn test_learning_rate_flat_history_is_zero() {
    let now = Utc::now();
    let attempts: Vec<_> = (0..12).map(|i| at(now, i, 70.0)).collect();
    assert_eq!(learning_rate(&attempts), 0.0);
  }

  #[test]
  fn test_learning_rate_ignores_input_order() {
    let now = Utc::now();
    let mut attempts: Vec<_> = (0..10)
      .map(|i| at(now, 100 - i, 10.0 + i as f64 * 10.0))
      .collect();
    attempts.reverse();
    assert_eq!(learning_rate(&attempts), 1.0);
  }

  #[test]
  fn test_learning_rate_uses_latest_fifty_only() {
    let now = Utc::now();
    // 50 recent flat attempts plus 20 older improving ones that must be ignored
    let mut attempts: Vec<_> = (0..50).map(|i| at(now, i, 50.0)).collect();
    attempts.extend((0..20).map(|i| at(now, 1000 - i, i as f64 * 5.0)));
    assert_eq!(learning_rate(&attempts), 0.0);
  }

  #[test]
  fn test_learning_rate_mixed() {
    let now = Utc::now();
    // Oldest first; window means step up only when the entering value beats the leaving one
    let accuracies = [50.0, 50.0, 50.0, 50.0, 50.0, 80.0, 40.0];
    let attempts: Vec<_> = accuracies
      .iter()
      .enumerate()
      .map(|(i, acc)| at(now, 100 - i as i64, *acc))
      .collect();
    // Windows: [50x5] -> +80 beats 50 (improve) -> +40 loses to 50 (no)
    assert_eq!(learning_rate(&attempts), 0.5);
  }

  #[test]
  fn test_learning_rate_full_sample_has_forty_five_comparisons() {
    let now = Utc::now();
    // 50 flat attempts, then one jump at the newest: only the last of the
    // 45 window steps improves
    let attempts: Vec<_> = (0..50)
      .map(|i| at(now, 50 - i, if i == 49 { 90.0 } else { 50.0 }))
      .collect();
    assert_eq!(learning_rate(&attempts), 1.0 / 45.0);

    // Older history beyond the sample does not add comparisons
    let mut longer = attempts.clone();
    longer.extend((0..20).map(|i| at(now, 1000 + i, 10.0 + i as f64)));
    assert_eq!(learning_rate(&longer), 1.0 / 45.0);
  }

  #[test]
  fn test_learning_rate_step_compares_entering_and_leaving_attempt() {
    let now = Utc::now();
    // Oldest first. Step 1: 60 enters, 40 leaves -> improve.
    // Step 2: 10 enters, 90 leaves -> no improvement.
    let accuracies = [40.0, 90.0, 50.0, 50.0, 50.0, 60.0, 10.0];
    let attempts: Vec<_> = accuracies
      .iter()
      .enumerate()
      .map(|(i, acc)| at(now, 100 - i as i64, *acc))
      .collect();
    assert_eq!(learning_rate(&attempts), 0.5);
  }

  // Retention

  #[test]
  fn test_retention_neutral_without_recent_data() {
    let now = Utc::now();
    let attempts = vec![days_ago(now, 10, 90.0)];
    assert_eq!(retention_score(&attempts, now), 0.5);
    assert_eq!(retention_score(&[], now), 0.5);
  }

  #[test]
  fn test_retention_held_without_older_data() {
    let now = Utc::now();
    let attempts = vec![days_ago(now, 1, 20.0)];
    assert_eq!(retention_score(&attempts, now), 0.8);
  }

  #[test]
  fn test_retention_held_when_recent_not_worse() {
    let now = Utc::now();
    let attempts = vec![days_ago(now, 1, 70.0), days_ago(now, 9, 70.0)];
    assert_eq!(retention_score(&attempts, now), 0.8);
  }

  #[test]
  fn test_retention_dropped_when_recent_worse() {
    let now = Utc::now();
    let attempts = vec![
      days_ago(now, 2, 50.0),
      days_ago(now, 3, 60.0),
      days_ago(now, 8, 80.0),
      days_ago(now, 13, 90.0),
    ];
    assert_eq!(retention_score(&attempts, now), 0.4);
  }

  #[test]
  fn test_retention_ignores_data_older_than_two_weeks() {
    let now = Utc::now();
    let attempts = vec![days_ago(now, 1, 50.0), days_ago(now, 20, 100.0)];
    assert_eq!(retention_score(&attempts, now), 0.8);
  }

  // Consistency

  #[test]
  fn test_consistency_low_below_five_attempts() {
    let now = Utc::now();
    let attempts: Vec<_> = (0..4).map(|d| days_ago(now, d, 80.0)).collect();
    assert_eq!(consistency_score(&attempts, now), 0.3);
  }

  #[test]
  fn test_consistency_counts_only_last_thirty_days() {
    let now = Utc::now();
    let mut attempts: Vec<_> = (0..4).map(|d| days_ago(now, d, 80.0)).collect();
    attempts.push(days_ago(now, 45, 80.0));
    assert_eq!(consistency_score(&attempts, now), 0.3);
  }

  #[test]
  fn test_consistency_twenty_one_days_is_full() {
    let now = Utc::now();
    let attempts: Vec<_> = (0..21).map(|d| days_ago(now, d, 80.0)).collect();
    assert_eq!(consistency_score(&attempts, now), 1.0);
  }

  #[test]
  fn test_consistency_clamped_above_target() {
    let now = Utc::now();
    let attempts: Vec<_> = (0..28).map(|d| days_ago(now, d, 80.0)).collect();
    assert_eq!(consistency_score(&attempts, now), 1.0);
  }

  #[test]
  fn test_consistency_same_day_attempts_count_once() {
    let now = Utc::now();
    // Ten attempts spread over exactly seven distinct days
    let mut attempts: Vec<_> = (0..7).map(|d| days_ago(now, d, 80.0)).collect();
    attempts.extend((1..4).map(|d| days_ago(now, d, 60.0)));
    assert!((consistency_score(&attempts, now) - 7.0 / 21.0).abs() < 1e-12);
  }

  #[test]
  fn test_overall_score_is_mean() {
    let estimate = MetricsEstimate {
      learning_rate: 0.5,
      retention_score: 0.8,
      consistency_score: 0.2,
    };
    assert!((estimate.overall_score() - 0.5).abs() < 1e-12);
  }
}
