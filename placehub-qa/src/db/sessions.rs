//! Session registry queries
//!
//! Establishes and recalls the pseudonymous identity of an otherwise
//! unauthenticated client. One row per client-chosen session token.

use placehub_common::models::Session;
use placehub_common::{time, Error, Result};
use sqlx::{Row, SqlitePool};

/// Initialize a session, or return the existing one unchanged
///
/// Creation is an upsert by primary key, not a read-then-write: concurrent
/// first contact from the same id converges to a single row instead of
/// surfacing a duplicate-key error. The icon chosen on first contact is
/// never overwritten.
pub async fn init_session(db: &SqlitePool, session_id: &str, animal_icon: &str) -> Result<Session> {
    sqlx::query(
        r#"
        INSERT INTO sessions (session_id, animal_icon, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT(session_id) DO NOTHING
        "#,
    )
    .bind(session_id)
    .bind(animal_icon)
    .bind(time::to_storage(time::now()))
    .execute(db)
    .await?;

    get_session(db, session_id).await
}

/// Fetch a session by id
pub async fn get_session(db: &SqlitePool, session_id: &str) -> Result<Session> {
    let row = sqlx::query("SELECT session_id, animal_icon, created_at FROM sessions WHERE session_id = ?")
        .bind(session_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Session not found: {}", session_id)))?;

    Ok(Session {
        session_id: row.get("session_id"),
        animal_icon: row.get("animal_icon"),
        created_at: time::from_storage(row.get::<String, _>("created_at").as_str())?,
    })
}
