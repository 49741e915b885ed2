//! Automatic question archival
//!
//! Runs a periodic sweep that transitions aged questions to `archived`.
//! The sweep is one bulk conditional update re-evaluated every tick, so a
//! failed or missed firing needs no catch-up: the next tick retries the
//! same predicate.

use crate::db::questions;
use placehub_common::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info};

/// Archive sweep configuration
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Sweep cadence in seconds (default: 30s)
    pub sweep_interval_secs: u64,

    /// Age after which a question is archived (default: 120s)
    pub max_age_secs: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 30,
            max_age_secs: 120,
        }
    }
}

impl ArchiveConfig {
    /// Load sweep configuration from database settings, falling back to
    /// defaults for missing or unparseable values
    pub async fn from_database(db: &SqlitePool) -> Self {
        let mut config = Self::default();

        if let Ok(interval_str) = sqlx::query_scalar::<_, String>(
            "SELECT value FROM settings WHERE key = 'archive_sweep_interval_secs'",
        )
        .fetch_one(db)
        .await
        {
            if let Ok(secs) = interval_str.parse::<u64>() {
                config.sweep_interval_secs = secs;
            }
        }

        if let Ok(age_str) = sqlx::query_scalar::<_, String>(
            "SELECT value FROM settings WHERE key = 'archive_max_age_secs'",
        )
        .fetch_one(db)
        .await
        {
            if let Ok(secs) = age_str.parse::<u64>() {
                config.max_age_secs = secs;
            }
        }

        config
    }
}

/// Archive sweep service
///
/// Spawned once at startup; runs for the lifetime of the process. Tests
/// call `sweep_once` directly instead of waiting on the timer.
pub struct ArchiveService {
    config: ArchiveConfig,
    db: SqlitePool,
}

impl ArchiveService {
    /// Create a new archive service
    pub fn new(config: ArchiveConfig, db: SqlitePool) -> Self {
        Self { config, db }
    }

    /// Run the archive sweep (spawns the background task)
    pub fn run(self: Arc<Self>) {
        info!(
            "Starting archive sweep (interval: {}s, max age: {}s)",
            self.config.sweep_interval_secs, self.config.max_age_secs
        );

        tokio::spawn(async move {
            let mut timer = interval(Duration::from_secs(self.config.sweep_interval_secs));
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                timer.tick().await;

                // A failed sweep is swallowed; the next tick retries the
                // same idempotent predicate
                if let Err(e) = self.sweep_once().await {
                    error!("Archive sweep failed: {}", e);
                }
            }
        });
    }

    /// Perform a single sweep
    pub async fn sweep_once(&self) -> Result<u64> {
        let archived = questions::archive_stale(&self.db, self.config.max_age_secs).await?;
        if archived > 0 {
            info!("Archived {} stale questions", archived);
        } else {
            debug!("Archive sweep found nothing to do");
        }
        Ok(archived)
    }
}
