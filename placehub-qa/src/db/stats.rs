//! Per-session statistics
//!
//! Read-only aggregation joining a session's answers to their parent
//! question's status. Fixed-shape output: statuses with no matching rows
//! report 0.

use placehub_common::models::SessionStats;
use placehub_common::Result;
use sqlx::{Row, SqlitePool};

/// Count a session's answers grouped by parent question status
///
/// Orphaned answers (parent question missing) drop out of the join and are
/// not counted.
pub async fn session_stats(db: &SqlitePool, session_id: &str) -> Result<SessionStats> {
    let rows = sqlx::query(
        r#"
        SELECT q.status AS status, COUNT(*) AS count
        FROM answers a
        JOIN questions q ON q.guid = a.question_id
        WHERE a.session_id = ?
        GROUP BY q.status
        "#,
    )
    .bind(session_id)
    .fetch_all(db)
    .await?;

    let mut stats = SessionStats::default();
    for row in rows {
        let count: i64 = row.get("count");
        match row.get::<String, _>("status").as_str() {
            "open" => stats.open = count,
            "active" => stats.active = count,
            "archived" => stats.archived = count,
            "reported" => stats.reported = count,
            _ => {}
        }
    }
    stats.total = stats.open + stats.active + stats.archived + stats.reported;

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{answers, questions};
    use placehub_common::models::{NewAnswer, QuestionStatus};
    use uuid::Uuid;

    async fn setup_test_db() -> (SqlitePool, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let pool = placehub_common::db::init_database(&dir.path().join("placehub.db"))
            .await
            .unwrap();
        (pool, dir)
    }

    async fn answer_for(db: &SqlitePool, question_id: Uuid, session_id: &str) {
        answers::create_answer(
            db,
            NewAnswer {
                question_id: question_id.to_string(),
                text: Some("an answer".to_string()),
                image_url: None,
                sender_icon: "🦊".to_string(),
                session_id: session_id.to_string(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_stats_empty_session_is_all_zero() {
        let (db, _dir) = setup_test_db().await;

        let stats = session_stats(&db, "nobody").await.unwrap();
        assert_eq!(stats, SessionStats::default());
    }

    #[tokio::test]
    async fn test_stats_group_by_parent_question_status() {
        let (db, _dir) = setup_test_db().await;

        let open = questions::create_question(&db, "q1", "asker").await.unwrap();
        let archived = questions::create_question(&db, "q2", "asker").await.unwrap();
        questions::set_status(&db, archived.id, QuestionStatus::Archived)
            .await
            .unwrap();

        answer_for(&db, open.id, "s1").await;
        answer_for(&db, open.id, "s1").await;
        answer_for(&db, archived.id, "s1").await;
        // Another session's answer must not be counted
        answer_for(&db, open.id, "someone-else").await;
        // Orphan answer drops out of the join
        answer_for(&db, Uuid::new_v4(), "s1").await;

        let stats = session_stats(&db, "s1").await.unwrap();
        assert_eq!(stats.open, 2);
        assert_eq!(stats.active, 0);
        assert_eq!(stats.archived, 1);
        assert_eq!(stats.reported, 0);
        assert_eq!(stats.total, 3);
    }
}
