//! Application configuration.
//!
//! Runtime settings resolve with priority: config.toml > environment
//! (`.env` included) > defaults. Tuning constants live here as well.

use serde::Deserialize;
use std::path::PathBuf;

use crate::paths;

// ==================== File Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
    server: Option<ServerConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    host: Option<String>,
    port: Option<u16>,
}

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Settings {
    /// Load from config.toml and the environment
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file = match std::fs::read_to_string(CONFIG_FILE) {
            Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring invalid {}: {}", CONFIG_FILE, e);
                    None
                }
            },
            Err(_) => None,
        };

        let settings = resolve(file.unwrap_or_default(), |key| std::env::var(key).ok());
        tracing::info!("Using database at {}", settings.database_path.display());
        settings
    }

    /// Full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn resolve(file: AppConfig, env: impl Fn(&str) -> Option<String>) -> Settings {
    let database_path = file
        .database
        .and_then(|db| db.path)
        .or_else(|| env("DATABASE_PATH"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(paths::db_path()));

    let (file_host, file_port) = match file.server {
        Some(server) => (server.host, server.port),
        None => (None, None),
    };

    let host = file_host
        .or_else(|| env("HOST"))
        .unwrap_or_else(|| SERVER_ADDR.to_string());

    let port = file_port
        .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
        .unwrap_or(SERVER_PORT);

    Settings {
        database_path,
        host,
        port,
    }
}

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "config.toml";

// ==================== Server Configuration ====================

/// Default address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default port
pub const SERVER_PORT: u16 = 3000;

// ==================== Session Configuration ====================

/// Session lifetime in hours (1 week)
pub const SESSION_DURATION_HOURS: i64 = 24 * 7;

// ==================== Study Plan Configuration ====================

/// Hours a generated plan stays current before it is regenerated on read
pub const PLAN_REFRESH_HOURS: i64 = 24;

/// Default and maximum number of plans returned by the history endpoint
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const MAX_HISTORY_LIMIT: usize = 50;

// ==================== Query Limits ====================

/// Default look-back for listing quiz attempts
pub const DEFAULT_ATTEMPT_DAYS: i64 = 30;

/// Longest look-back accepted by any `days` query parameter
pub const MAX_QUERY_DAYS: i64 = 365;

pub const DEFAULT_LEADERBOARD_DAYS: i64 = 7;
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
pub const MAX_LEADERBOARD_LIMIT: usize = 100;
