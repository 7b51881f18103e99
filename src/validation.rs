//! Input validation for request payloads.
//!
//! Each check returns the message shown to the client on failure.

use chrono::{DateTime, Duration, Utc};

/// Longest subject name accepted
pub const MAX_SUBJECT_LEN: usize = 64;

/// Largest quiz accepted as one attempt
pub const MAX_QUESTIONS_PER_ATTEMPT: i64 = 1000;

/// Tolerated client clock drift for attempt timestamps
pub const MAX_CLOCK_SKEW_MINUTES: i64 = 5;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 32;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Subject must be non-empty after trimming. Returns the trimmed name.
pub fn validate_subject(subject: &str) -> Result<&str, String> {
  let trimmed = subject.trim();
  if trimmed.is_empty() {
    return Err("Subject is required".to_string());
  }
  if trimmed.chars().count() > MAX_SUBJECT_LEN {
    return Err(format!(
      "Subject must be at most {} characters",
      MAX_SUBJECT_LEN
    ));
  }
  Ok(trimmed)
}

/// Score bounds for a single quiz attempt
pub fn validate_score(score: i64, total_questions: i64) -> Result<(), String> {
  if total_questions <= 0 {
    return Err("totalQuestions must be greater than zero".to_string());
  }
  if total_questions > MAX_QUESTIONS_PER_ATTEMPT {
    return Err(format!(
      "totalQuestions must be at most {}",
      MAX_QUESTIONS_PER_ATTEMPT
    ));
  }
  if score < 0 || score > total_questions {
    return Err(format!(
      "score must be between 0 and {}",
      total_questions
    ));
  }
  Ok(())
}

/// Caller-supplied accuracy percentage
pub fn validate_accuracy(accuracy: Option<f64>) -> Result<(), String> {
  match accuracy {
    Some(a) if !a.is_finite() || !(0.0..=100.0).contains(&a) => {
      Err("accuracy must be between 0 and 100".to_string())
    }
    _ => Ok(()),
  }
}

/// Attempt time may not be later than `now` beyond a small skew
pub fn validate_timestamp(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), String> {
  if timestamp > now + Duration::minutes(MAX_CLOCK_SKEW_MINUTES) {
    return Err("timestamp cannot be in the future".to_string());
  }
  Ok(())
}

/// Username: 3-32 chars, ASCII alphanumeric or underscore
pub fn validate_username(username: &str) -> Result<(), String> {
  let len = username.len();
  if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
    return Err(format!(
      "Username must be {}-{} characters",
      MIN_USERNAME_LEN, MAX_USERNAME_LEN
    ));
  }
  if !username
    .chars()
    .all(|c| c.is_ascii_alphanumeric() || c == '_')
  {
    return Err("Username may only contain letters, numbers and underscores".to_string());
  }
  Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(format!(
      "Password must be at least {} characters",
      MIN_PASSWORD_LEN
    ));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_subject_trimmed() {
    assert_eq!(validate_subject("  Physics ").unwrap(), "Physics");
  }

  #[test]
  fn test_subject_rejects_blank_and_long() {
    assert!(validate_subject("").is_err());
    assert!(validate_subject("   ").is_err());
    assert!(validate_subject(&"x".repeat(MAX_SUBJECT_LEN)).is_ok());
    assert!(validate_subject(&"x".repeat(MAX_SUBJECT_LEN + 1)).is_err());
  }

  #[test]
  fn test_score_bounds() {
    assert!(validate_score(0, 10).is_ok());
    assert!(validate_score(10, 10).is_ok());
    assert!(validate_score(11, 10).is_err());
    assert!(validate_score(-1, 10).is_err());
    assert!(validate_score(0, 0).is_err());
  }

  #[test]
  fn test_total_questions_upper_bound() {
    assert!(validate_score(0, MAX_QUESTIONS_PER_ATTEMPT).is_ok());
    assert!(validate_score(0, MAX_QUESTIONS_PER_ATTEMPT + 1).is_err());
    assert!(validate_score(0, i64::MAX).is_err());
  }

  #[test]
  fn test_timestamp_rejects_future() {
    let now = Utc::now();
    assert!(validate_timestamp(now - Duration::days(3), now).is_ok());
    assert!(validate_timestamp(now + Duration::minutes(1), now).is_ok());
    assert!(validate_timestamp(now + Duration::hours(1), now).is_err());
    assert!(validate_timestamp(now + Duration::days(365), now).is_err());
  }

  #[test]
  fn test_accuracy_bounds() {
    assert!(validate_accuracy(None).is_ok());
    assert!(validate_accuracy(Some(0.0)).is_ok());
    assert!(validate_accuracy(Some(100.0)).is_ok());
    assert!(validate_accuracy(Some(100.5)).is_err());
    assert!(validate_accuracy(Some(-0.1)).is_err());
    assert!(validate_accuracy(Some(f64::NAN)).is_err());
  }

  #[test]
  fn test_valid_usernames() {
    assert!(validate_username("abc").is_ok());
    assert!(validate_username("jee_aspirant_2027").is_ok());
    assert!(validate_username(&"a".repeat(32)).is_ok());
  }

  #[test]
  fn test_invalid_usernames() {
    assert!(validate_username("ab").is_err());
    assert!(validate_username(&"a".repeat(33)).is_err());
    assert!(validate_username("has space").is_err());
    assert!(validate_username("dash-ed").is_err());
    assert!(validate_username("ünï").is_err());
  }

  #[test]
  fn test_password_length() {
    assert!(validate_password("1234567").is_err());
    assert!(validate_password("12345678").is_ok());
  }
}
