//! Random identifiers for sessions and plan topics.

use rand::Rng;
use uuid::Uuid;

/// Generate a new session token (32 chars of [0-9a-z])
pub fn generate_session_id() -> String {
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

/// Generate a random topic identifier (UUID v4)
pub fn generate_topic_id() -> String {
  Uuid::new_v4().to_string()
}
