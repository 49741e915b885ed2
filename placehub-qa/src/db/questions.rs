//! Question store queries
//!
//! Questions are created `open`, archived by the background sweep once they
//! age past the threshold, and re-statused freely by moderation. Rows are
//! never deleted.

use chrono::Duration;
use placehub_common::models::{Question, QuestionStatus, QuestionWithCount};
use placehub_common::{time, Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

fn question_from_row(row: &SqliteRow) -> Result<Question> {
    Ok(Question {
        id: Uuid::parse_str(row.get::<String, _>("guid").as_str())
            .map_err(|e| Error::Internal(format!("Invalid question guid: {}", e)))?,
        text: row.get("text"),
        session_id: row.get("session_id"),
        status: row.get::<String, _>("status").parse()?,
        summary: row.get("summary"),
        created_at: time::from_storage(row.get::<String, _>("created_at").as_str())?,
    })
}

/// Create a question with status `open`
pub async fn create_question(db: &SqlitePool, text: &str, session_id: &str) -> Result<Question> {
    if text.trim().is_empty() {
        return Err(Error::InvalidInput("Question text is required".to_string()));
    }

    let question = Question {
        id: Uuid::new_v4(),
        text: text.to_string(),
        session_id: session_id.to_string(),
        status: QuestionStatus::Open,
        summary: None,
        created_at: time::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO questions (guid, text, session_id, status, summary, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(question.id.to_string())
    .bind(&question.text)
    .bind(&question.session_id)
    .bind(question.status.as_str())
    .bind(&question.summary)
    .bind(time::to_storage(question.created_at))
    .execute(db)
    .await?;

    Ok(question)
}

/// All questions, newest first, each with its live answer count
///
/// The count is recomputed on every call so it never lags the answer store.
pub async fn list_questions(db: &SqlitePool) -> Result<Vec<QuestionWithCount>> {
    let rows = sqlx::query(
        r#"
        SELECT q.guid, q.text, q.session_id, q.status, q.summary, q.created_at,
               (SELECT COUNT(*) FROM answers a WHERE a.question_id = q.guid) AS answer_count
        FROM questions q
        ORDER BY q.created_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(QuestionWithCount {
                question: question_from_row(row)?,
                answer_count: row.get("answer_count"),
            })
        })
        .collect()
}

/// Fetch a question by id
pub async fn get_question(db: &SqlitePool, id: Uuid) -> Result<Question> {
    let row = sqlx::query(
        "SELECT guid, text, session_id, status, summary, created_at FROM questions WHERE guid = ?",
    )
    .bind(id.to_string())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Question not found: {}", id)))?;

    question_from_row(&row)
}

/// Overwrite a question's status (moderation path)
///
/// Any status may be set from any prior status; there is no transition
/// validation beyond the value parsing as a known status.
pub async fn set_status(db: &SqlitePool, id: Uuid, status: QuestionStatus) -> Result<Question> {
    let result = sqlx::query("UPDATE questions SET status = ? WHERE guid = ?")
        .bind(status.as_str())
        .bind(id.to_string())
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Question not found: {}", id)));
    }

    get_question(db, id).await
}

/// Archive every question older than `max_age_secs` that is not archived yet
///
/// One bulk conditional update; idempotent, so a failed sweep is simply
/// retried by the next one. Returns the number of rows transitioned.
pub async fn archive_stale(db: &SqlitePool, max_age_secs: u64) -> Result<u64> {
    let cutoff = time::now() - Duration::seconds(max_age_secs as i64);

    let result = sqlx::query(
        r#"
        UPDATE questions
        SET status = 'archived'
        WHERE status != 'archived' AND created_at < ?
        "#,
    )
    .bind(time::to_storage(cutoff))
    .execute(db)
    .await?;

    Ok(result.rows_affected())
}
