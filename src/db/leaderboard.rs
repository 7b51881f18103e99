//! Score leaderboard over a trailing window

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};
use serde::Serialize;

use super::to_db_time;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: i64,
    pub username: String,
    pub total_score: i64,
    pub total_questions: i64,
    pub accuracy: f64,
    pub attempts: i64,
}

/// Users ranked by total score since `since`, then accuracy, then username
pub fn get_leaderboard(
    conn: &Connection,
    since: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT u.id, u.username,
           SUM(q.score) AS total_score,
           SUM(q.total_questions) AS total_questions,
           CASE WHEN SUM(q.total_questions) > 0
                THEN CAST(SUM(q.score) AS REAL) * 100.0 / SUM(q.total_questions)
                ELSE 0.0 END AS accuracy,
           COUNT(*) AS attempts
    FROM quiz_attempts q
    JOIN users u ON q.user_id = u.id
    WHERE q.attempted_at >= ?1
    GROUP BY u.id
    ORDER BY total_score DESC, accuracy DESC, u.username ASC
    LIMIT ?2
    "#,
    )?;

    let rows = stmt
        .query_map(params![to_db_time(since), limit as i64], |row| {
            Ok(LeaderboardEntry {
                rank: 0,
                user_id: row.get(0)?,
                username: row.get(1)?,
                total_score: row.get(2)?,
                total_questions: row.get(3)?,
                accuracy: row.get(4)?,
                attempts: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(i, entry)| LeaderboardEntry { rank: i + 1, ..entry })
        .collect())
}
