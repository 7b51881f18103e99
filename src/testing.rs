//! Test utilities for database setup.
//!
//! Reuses the real migrations so tests never carry their own copy of the
//! schema.

use rusqlite::Connection;
use tempfile::TempDir;

/// Migrated database in a temporary directory, removed when dropped.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = Connection::open(temp.path().join("planner.db"))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        crate::db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Insert a user with a throwaway password hash, returning its id
    pub fn create_user(&self, username: &str) -> rusqlite::Result<i64> {
        crate::auth::db::create_user(&self.conn, username, "test-hash")
    }
}
