//! Quiz attempt history

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};

use super::{time_column, to_db_time};
use crate::domain::QuizAttempt;

const ATTEMPT_COLUMNS: &str =
    "id, user_id, subject, score, total_questions, accuracy, attempted_at";

/// Store an attempt, returning its new row id
pub fn insert_attempt(conn: &Connection, attempt: &QuizAttempt) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO quiz_attempts (user_id, subject, score, total_questions, accuracy, attempted_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
        params![
            attempt.user_id,
            attempt.subject,
            attempt.score,
            attempt.total_questions,
            attempt.accuracy,
            to_db_time(attempt.timestamp),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Attempts at or after `since`, optionally for one subject, newest first
pub fn get_attempts_since(
    conn: &Connection,
    user_id: i64,
    since: DateTime<Utc>,
    subject: Option<&str>,
) -> Result<Vec<QuizAttempt>> {
    let sql = format!(
        r#"
    SELECT {}
    FROM quiz_attempts
    WHERE user_id = ?1 AND attempted_at >= ?2 AND (?3 IS NULL OR subject = ?3)
    ORDER BY attempted_at DESC, id DESC
    "#,
        ATTEMPT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;

    let attempts = stmt
        .query_map(params![user_id, to_db_time(since), subject], row_to_attempt)?
        .collect::<Result<Vec<_>>>()?;

    Ok(attempts)
}

/// The `limit` most recent attempts regardless of age, newest first
pub fn get_recent_attempts(conn: &Connection, user_id: i64, limit: usize) -> Result<Vec<QuizAttempt>> {
    let sql = format!(
        r#"
    SELECT {}
    FROM quiz_attempts
    WHERE user_id = ?1
    ORDER BY attempted_at DESC, id DESC
    LIMIT ?2
    "#,
        ATTEMPT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;

    let attempts = stmt
        .query_map(params![user_id, limit as i64], row_to_attempt)?
        .collect::<Result<Vec<_>>>()?;

    Ok(attempts)
}

fn row_to_attempt(row: &rusqlite::Row) -> Result<QuizAttempt> {
    Ok(QuizAttempt {
        id: row.get(0)?,
        user_id: row.get(1)?,
        subject: row.get(2)?,
        score: row.get(3)?,
        total_questions: row.get(4)?,
        accuracy: row.get(5)?,
        timestamp: time_column(row, 6)?,
    })
}
