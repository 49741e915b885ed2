//! Database initialization
//!
//! Creates the database on first run and brings the schema up idempotently.
//! Every create is `IF NOT EXISTS`, so startup is safe against an existing
//! database.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc creates the database file on first run
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    init_schema(&pool).await?;
    init_settings_defaults(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent - safe to call multiple times)
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    create_sessions_table(pool).await?;
    create_questions_table(pool).await?;
    create_answers_table(pool).await?;
    create_settings_table(pool).await?;
    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            session_id TEXT PRIMARY KEY,
            animal_icon TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_questions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            guid TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            session_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'open',
            summary TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // The archive sweep filters on status + created_at
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_questions_status_created ON questions(status, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_answers_table(pool: &SqlitePool) -> Result<()> {
    // No foreign key to questions: an orphaned answer referencing a missing
    // question is accepted (parent existence is not verified on submit)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS answers (
            guid TEXT PRIMARY KEY,
            question_id TEXT NOT NULL,
            text TEXT,
            image_url TEXT,
            sender_icon TEXT NOT NULL,
            session_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'open',
            reactions TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_answers_question ON answers(question_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_answers_session ON answers(session_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize settings table with default values
pub async fn init_settings_defaults(pool: &SqlitePool) -> Result<()> {
    let defaults = vec![
        // Archive sweep cadence and age threshold
        ("archive_sweep_interval_secs", "30"),
        ("archive_max_age_secs", "120"),
    ];

    for (key, default_value) in defaults {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
            .bind(key)
            .fetch_one(pool)
            .await?;

        if !exists {
            sqlx::query("INSERT INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(default_value)
                .execute(pool)
                .await?;

            info!(
                "Initialized setting '{}' with default value: {}",
                key, default_value
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_database_creates_file_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("placehub.db");

        let pool = init_database(&db_path).await.unwrap();
        assert!(db_path.exists());

        // All four tables exist
        for table in ["sessions", "questions", "answers", "settings"] {
            let found: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert!(found, "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn test_settings_defaults_are_seeded_once() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("placehub.db");
        let pool = init_database(&db_path).await.unwrap();

        let interval: String =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = 'archive_sweep_interval_secs'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(interval, "30");

        // Re-running init must not clobber an operator override
        sqlx::query("UPDATE settings SET value = '10' WHERE key = 'archive_sweep_interval_secs'")
            .execute(&pool)
            .await
            .unwrap();
        init_settings_defaults(&pool).await.unwrap();

        let interval: String =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = 'archive_sweep_interval_secs'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(interval, "10");
    }
}
