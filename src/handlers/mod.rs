//! HTTP handlers for the JSON API.

pub mod attempts;
pub mod error;
pub mod leaderboard;
pub mod study_plan;

use axum::Json;
use serde_json::{json, Value};

pub use error::{ApiError, ApiJson, ApiQuery};

/// GET /health
pub async fn health() -> Json<Value> {
  Json(json!({
    "status": "ok",
    "version": env!("CARGO_PKG_VERSION"),
  }))
}
