//! Persisted study plans.
//!
//! Plans are append-only: a new generation inserts a new row and the
//! "current" plan is simply the most recently updated one. The only
//! in-place change is topic completion via [`update_plan_progress`].

use rusqlite::{params, Connection, OptionalExtension, Result};

use super::{json_column, time_column, to_db_time, to_json};
use crate::domain::StudyPlan;

const PLAN_COLUMNS: &str = r#"
    id, user_id, subjects, performance, recommendations, study_goals, ai_metrics,
    total_study_time, completion_status, version, created_at, last_updated, next_refresh_time
"#;

/// Insert a plan and return its new id (the `id` field of `plan` is ignored)
pub fn insert_plan(conn: &Connection, plan: &StudyPlan) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO study_plans
      (user_id, subjects, performance, recommendations, study_goals, ai_metrics,
       total_study_time, completion_status, version, created_at, last_updated, next_refresh_time)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
    "#,
        params![
            plan.user_id,
            to_json(&plan.subjects)?,
            to_json(&plan.performance)?,
            to_json(&plan.recommendations)?,
            to_json(&plan.study_goals)?,
            to_json(&plan.ai_metrics)?,
            plan.total_study_time,
            plan.completion_status,
            plan.version,
            to_db_time(plan.created_at),
            to_db_time(plan.last_updated),
            to_db_time(plan.next_refresh_time),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recently updated plan for a user
pub fn get_latest_plan(conn: &Connection, user_id: i64) -> Result<Option<StudyPlan>> {
    let sql = format!(
        "SELECT {} FROM study_plans WHERE user_id = ?1 ORDER BY last_updated DESC, id DESC LIMIT 1",
        PLAN_COLUMNS
    );
    conn.query_row(&sql, params![user_id], row_to_plan).optional()
}

/// Plan by id, restricted to its owner
pub fn get_user_plan(conn: &Connection, user_id: i64, plan_id: i64) -> Result<Option<StudyPlan>> {
    let sql = format!(
        "SELECT {} FROM study_plans WHERE id = ?1 AND user_id = ?2",
        PLAN_COLUMNS
    );
    conn.query_row(&sql, params![plan_id, user_id], row_to_plan).optional()
}

/// Most recent plans for a user, newest first
pub fn get_plan_history(conn: &Connection, user_id: i64, limit: usize) -> Result<Vec<StudyPlan>> {
    let sql = format!(
        "SELECT {} FROM study_plans WHERE user_id = ?1 ORDER BY last_updated DESC, id DESC LIMIT ?2",
        PLAN_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let plans = stmt
        .query_map(params![user_id, limit as i64], row_to_plan)?
        .collect::<Result<Vec<_>>>()?;
    Ok(plans)
}

/// Highest version stored for a user (0 if none)
pub fn get_latest_version(conn: &Connection, user_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM study_plans WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
}

pub fn count_user_plans(conn: &Connection, user_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM study_plans WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
}

/// Write back topic completion state for an existing plan
pub fn update_plan_progress(conn: &Connection, plan: &StudyPlan) -> Result<()> {
    conn.execute(
        r#"
    UPDATE study_plans
    SET subjects = ?1, completion_status = ?2, last_updated = ?3
    WHERE id = ?4
    "#,
        params![
            to_json(&plan.subjects)?,
            plan.completion_status,
            to_db_time(plan.last_updated),
            plan.id,
        ],
    )?;
    Ok(())
}

fn row_to_plan(row: &rusqlite::Row) -> Result<StudyPlan> {
    Ok(StudyPlan {
        id: row.get(0)?,
        user_id: row.get(1)?,
        subjects: json_column(row, 2)?,
        performance: json_column(row, 3)?,
        recommendations: json_column(row, 4)?,
        study_goals: json_column(row, 5)?,
        ai_metrics: json_column(row, 6)?,
        total_study_time: row.get(7)?,
        completion_status: row.get(8)?,
        version: row.get(9)?,
        created_at: time_column(row, 10)?,
        last_updated: time_column(row, 11)?,
        next_refresh_time: time_column(row, 12)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AdaptiveLevel, AiMetrics, PerformanceSummary, StudyPlan};
    use crate::testing::TestEnv;
    use chrono::{Duration, Utc};

    fn plan(user_id: i64, version: i64, age_hours: i64) -> StudyPlan {
        let created = Utc::now() - Duration::hours(age_hours);
        StudyPlan {
            id: 0,
            user_id,
            subjects: vec![],
            performance: PerformanceSummary::default(),
            recommendations: vec![],
            study_goals: vec![],
            ai_metrics: AiMetrics {
                learning_rate: 0.5,
                retention_score: 0.5,
                consistency_score: 0.3,
                adaptive_level: AdaptiveLevel::Beginner,
            },
            total_study_time: 0,
            completion_status: 0,
            version,
            created_at: created,
            last_updated: created,
            next_refresh_time: created + Duration::hours(24),
        }
    }

    #[test]
    fn test_latest_plan_is_most_recently_updated() {
        let env = TestEnv::new().unwrap();
        let user = env.create_user("asha").unwrap();

        assert!(get_latest_plan(&env.conn, user).unwrap().is_none());

        insert_plan(&env.conn, &plan(user, 1, 30)).unwrap();
        let newest = insert_plan(&env.conn, &plan(user, 2, 1)).unwrap();

        let latest = get_latest_plan(&env.conn, user).unwrap().unwrap();
        assert_eq!(latest.id, newest);
        assert_eq!(latest.version, 2);
        assert_eq!(get_latest_version(&env.conn, user).unwrap(), 2);
        assert_eq!(count_user_plans(&env.conn, user).unwrap(), 2);
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let env = TestEnv::new().unwrap();
        let user = env.create_user("asha").unwrap();
        let stored = plan(user, 1, 0);

        let id = insert_plan(&env.conn, &stored).unwrap();
        let loaded = get_user_plan(&env.conn, user, id).unwrap().unwrap();

        assert_eq!(loaded.created_at, stored.created_at);
        assert_eq!(loaded.next_refresh_time, stored.next_refresh_time);
        assert_eq!(loaded.ai_metrics, stored.ai_metrics);
        assert_eq!(StudyPlan { id: 0, ..loaded }, stored);
    }

    #[test]
    fn test_user_plan_is_owner_scoped() {
        let env = TestEnv::new().unwrap();
        let asha = env.create_user("asha").unwrap();
        let ravi = env.create_user("ravi").unwrap();
        let id = insert_plan(&env.conn, &plan(asha, 1, 0)).unwrap();

        assert!(get_user_plan(&env.conn, asha, id).unwrap().is_some());
        assert!(get_user_plan(&env.conn, ravi, id).unwrap().is_none());
        assert!(get_user_plan(&env.conn, asha, id + 100).unwrap().is_none());
    }

    #[test]
    fn test_history_order_and_limit() {
        let env = TestEnv::new().unwrap();
        let user = env.create_user("asha").unwrap();
        for (version, age) in [(1, 72), (2, 48), (3, 24)] {
            insert_plan(&env.conn, &plan(user, version, age)).unwrap();
        }

        let history = get_plan_history(&env.conn, user, 2).unwrap();
        let versions: Vec<i64> = history.iter().map(|p| p.version).collect();
        assert_eq!(versions, vec![3, 2]);
    }

    #[test]
    fn test_update_progress() {
        let env = TestEnv::new().unwrap();
        let user = env.create_user("asha").unwrap();
        let id = insert_plan(&env.conn, &plan(user, 1, 2)).unwrap();

        let mut loaded = get_user_plan(&env.conn, user, id).unwrap().unwrap();
        loaded.completion_status = 50;
        loaded.last_updated = Utc::now();
        update_plan_progress(&env.conn, &loaded).unwrap();

        let reloaded = get_user_plan(&env.conn, user, id).unwrap().unwrap();
        assert_eq!(reloaded.completion_status, 50);
        assert_eq!(reloaded.last_updated, loaded.last_updated);
    }
}
