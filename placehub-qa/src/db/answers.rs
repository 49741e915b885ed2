//! Answer store queries
//!
//! Answers belong to exactly one question and carry either text or an image
//! payload plus a free-form reaction tally. Rows are never deleted; reacting
//! and moderation mutate them in place.

use placehub_common::models::{Answer, AnswerStatus, NewAnswer, ReactionTally};
use placehub_common::{time, Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

fn answer_from_row(row: &SqliteRow) -> Result<Answer> {
    Ok(Answer {
        id: Uuid::parse_str(row.get::<String, _>("guid").as_str())
            .map_err(|e| Error::Internal(format!("Invalid answer guid: {}", e)))?,
        question_id: Uuid::parse_str(row.get::<String, _>("question_id").as_str())
            .map_err(|e| Error::Internal(format!("Invalid parent question id: {}", e)))?,
        text: row.get("text"),
        image_url: row.get("image_url"),
        sender_icon: row.get("sender_icon"),
        session_id: row.get("session_id"),
        status: row.get::<String, _>("status").parse()?,
        reactions: ReactionTally::from_storage(row.get::<String, _>("reactions").as_str())?,
        created_at: time::from_storage(row.get::<String, _>("created_at").as_str())?,
    })
}

const ANSWER_COLUMNS: &str =
    "guid, question_id, text, image_url, sender_icon, session_id, status, reactions, created_at";

/// Create an answer with the default zero-seeded reaction tally
///
/// The parent question id must parse as a UUID, but the parent's existence
/// is not verified: an orphaned answer referencing a missing question is
/// accepted. Exactly one content form (text or image) must be present.
pub async fn create_answer(db: &SqlitePool, new_answer: NewAnswer) -> Result<Answer> {
    let question_id = Uuid::parse_str(new_answer.question_id.trim())
        .map_err(|_| Error::InvalidInput(format!("Invalid question id: {}", new_answer.question_id)))?;

    let text = new_answer
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from);
    let image_url = new_answer
        .image_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(String::from);

    match (&text, &image_url) {
        (None, None) => {
            return Err(Error::InvalidInput(
                "Answer requires text or an image".to_string(),
            ))
        }
        (Some(_), Some(_)) => {
            return Err(Error::InvalidInput(
                "Answer may carry text or an image, not both".to_string(),
            ))
        }
        _ => {}
    }

    let answer = Answer {
        id: Uuid::new_v4(),
        question_id,
        text,
        image_url,
        sender_icon: new_answer.sender_icon,
        session_id: new_answer.session_id,
        status: AnswerStatus::Open,
        reactions: ReactionTally::seeded(),
        created_at: time::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO answers (guid, question_id, text, image_url, sender_icon, session_id, status, reactions, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(answer.id.to_string())
    .bind(answer.question_id.to_string())
    .bind(&answer.text)
    .bind(&answer.image_url)
    .bind(&answer.sender_icon)
    .bind(&answer.session_id)
    .bind(answer.status.as_str())
    .bind(answer.reactions.to_storage())
    .bind(time::to_storage(answer.created_at))
    .execute(db)
    .await?;

    Ok(answer)
}

/// All answers for a question in chronological reading order (oldest first)
pub async fn list_by_question(db: &SqlitePool, question_id: Uuid) -> Result<Vec<Answer>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM answers WHERE question_id = ? ORDER BY created_at ASC",
        ANSWER_COLUMNS
    ))
    .bind(question_id.to_string())
    .fetch_all(db)
    .await?;

    rows.iter().map(answer_from_row).collect()
}

/// Fetch an answer by id, or None if it does not exist
pub async fn get_answer(db: &SqlitePool, answer_id: Uuid) -> Result<Option<Answer>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM answers WHERE guid = ?",
        ANSWER_COLUMNS
    ))
    .bind(answer_id.to_string())
    .fetch_optional(db)
    .await?;

    row.as_ref().map(answer_from_row).transpose()
}

/// Increment a reaction label on an answer, creating the label at 1 if new
///
/// Returns None when the answer does not exist (the caller decides whether
/// that is a 404 or a silent drop).
///
/// This is a load-bump-store over the whole tally, not an atomic increment:
/// two concurrent reactions to the same answer and label can both read the
/// same base count and each write base+1, losing one. The counter is
/// best-effort, not exact.
pub async fn react(db: &SqlitePool, answer_id: Uuid, label: &str) -> Result<Option<Answer>> {
    let Some(mut answer) = get_answer(db, answer_id).await? else {
        return Ok(None);
    };

    answer.reactions.bump(label);

    sqlx::query("UPDATE answers SET reactions = ? WHERE guid = ?")
        .bind(answer.reactions.to_storage())
        .bind(answer_id.to_string())
        .execute(db)
        .await?;

    Ok(Some(answer))
}

/// Overwrite an answer's status (moderation path)
pub async fn set_status(db: &SqlitePool, answer_id: Uuid, status: AnswerStatus) -> Result<Answer> {
    let result = sqlx::query("UPDATE answers SET status = ? WHERE guid = ?")
        .bind(status.as_str())
        .bind(answer_id.to_string())
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Answer not found: {}", answer_id)));
    }

    get_answer(db, answer_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Answer not found: {}", answer_id)))
}
