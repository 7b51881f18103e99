//! User and session storage.

use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};
use sha2::{Digest, Sha256};

use crate::db::{to_db_time, LogOnError};

/// Sessions are looked up by the SHA-256 of the token, never the token itself
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Create a new user, returning the user ID
pub fn create_user(conn: &Connection, username: &str, password_hash: &str) -> Result<i64> {
    let now = to_db_time(Utc::now());
    conn.execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![username, password_hash, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get user by username, returns (id, username, password_hash)
pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<(i64, String, String)>> {
    conn.query_row(
        "SELECT id, username, password_hash FROM users WHERE username = ?1",
        params![username],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )
    .optional()
}

/// Whether `err` is a UNIQUE constraint violation (e.g. a duplicate username)
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

pub fn username_exists(conn: &Connection, username: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn update_last_login(conn: &Connection, user_id: i64) -> Result<()> {
    let now = to_db_time(Utc::now());
    conn.execute(
        "UPDATE users SET last_login_at = ?1 WHERE id = ?2",
        params![now, user_id],
    )?;
    Ok(())
}

/// Create a new session for `token`
pub fn create_session(
    conn: &Connection,
    user_id: i64,
    token: &str,
    duration_hours: i64,
) -> Result<()> {
    let now = Utc::now();
    let expires = now + Duration::hours(duration_hours);
    conn.execute(
        "INSERT INTO sessions (token_hash, user_id, created_at, expires_at, last_access_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            hash_token(token),
            user_id,
            to_db_time(now),
            to_db_time(expires),
            to_db_time(now)
        ],
    )?;
    Ok(())
}

/// Validate session and get user info, returns (user_id, username)
pub fn get_session_user(conn: &Connection, token: &str) -> Result<Option<(i64, String)>> {
    let now = to_db_time(Utc::now());
    let token_hash = hash_token(token);
    let user = conn
        .query_row(
            r#"
        SELECT u.id, u.username
        FROM sessions s
        JOIN users u ON s.user_id = u.id
        WHERE s.token_hash = ?1 AND s.expires_at > ?2
    "#,
            params![token_hash, now],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    if user.is_some() {
        // Update last access time
        conn.execute(
            "UPDATE sessions SET last_access_at = ?1 WHERE token_hash = ?2",
            params![now, token_hash],
        )
        .log_warn("Failed to update session access time");
    }
    Ok(user)
}

/// Delete a session (logout)
pub fn delete_session(conn: &Connection, token: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM sessions WHERE token_hash = ?1",
        params![hash_token(token)],
    )?;
    Ok(())
}

/// Cleanup expired sessions, returns count of deleted sessions
pub fn cleanup_expired_sessions(conn: &Connection) -> Result<usize> {
    let now = to_db_time(Utc::now());
    let count = conn.execute("DELETE FROM sessions WHERE expires_at < ?1", params![now])?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn test_username_is_case_insensitive() {
        let env = TestEnv::new().unwrap();
        create_user(&env.conn, "Asha", "h").unwrap();

        assert!(username_exists(&env.conn, "asha").unwrap());
        let err = create_user(&env.conn, "ASHA", "h").unwrap_err();
        assert!(is_unique_violation(&err));
        assert!(!is_unique_violation(&rusqlite::Error::QueryReturnedNoRows));
        let (_, stored, _) = get_user_by_username(&env.conn, "asha").unwrap().unwrap();
        assert_eq!(stored, "Asha");
    }

    #[test]
    fn test_session_lifecycle() {
        let env = TestEnv::new().unwrap();
        let user = env.create_user("asha").unwrap();

        create_session(&env.conn, user, "token-1", 24).unwrap();
        let found = get_session_user(&env.conn, "token-1").unwrap();
        assert_eq!(found, Some((user, "asha".to_string())));
        assert_eq!(get_session_user(&env.conn, "other").unwrap(), None);

        delete_session(&env.conn, "token-1").unwrap();
        assert_eq!(get_session_user(&env.conn, "token-1").unwrap(), None);
    }

    #[test]
    fn test_token_not_stored_in_clear() {
        let env = TestEnv::new().unwrap();
        let user = env.create_user("asha").unwrap();
        create_session(&env.conn, user, "secret-token", 24).unwrap();

        let stored: String = env
            .conn
            .query_row("SELECT token_hash FROM sessions", [], |row| row.get(0))
            .unwrap();
        assert_ne!(stored, "secret-token");
        assert_eq!(stored, hash_token("secret-token"));
        assert_eq!(stored.len(), 64);
    }

    #[test]
    fn test_expired_sessions_rejected_and_cleaned() {
        let env = TestEnv::new().unwrap();
        let user = env.create_user("asha").unwrap();
        create_session(&env.conn, user, "stale", -1).unwrap();

        assert_eq!(get_session_user(&env.conn, "stale").unwrap(), None);
        assert_eq!(cleanup_expired_sessions(&env.conn).unwrap(), 1);
    }
}
