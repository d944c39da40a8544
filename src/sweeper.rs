//! Inactivity sweeper.
//!
//! Every tick, participants whose last heartbeat is older than the inactivity
//! threshold are removed and a departure message is broadcast for each. The
//! delete and the departure message commit together, and the delete only
//! matches a participant that is still stale, so a heartbeat racing the sweep
//! keeps the participant and no departure is announced.
//!
//! Participants are retired one transaction at a time. SQLite admits a single
//! writer, so running them side by side only trades progress for busy errors.

use std::time::Duration;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::db::{self, MessageKind, BROADCAST, DEPARTED_TEXT};

const DEFAULT_INTERVAL_SECONDS: u64 = 15;
const DEFAULT_INACTIVITY_SECONDS: u64 = 10;

const STALE_QUERY: &str = "SELECT name FROM participants WHERE last_status < ?";

#[derive(Debug, Clone)]
pub struct SweeperConfig {
    pub interval_seconds: u64,
    /// Heartbeats older than this many seconds count as gone.
    pub inactivity_seconds: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_INTERVAL_SECONDS,
            inactivity_seconds: DEFAULT_INACTIVITY_SECONDS,
        }
    }
}

/// Runs sweeps on the configured interval until `cancel_token` fires.
#[instrument(skip_all, name = "chat.task.sweeper")]
pub async fn start_sweeper(
    db_pool: SqlitePool,
    config: SweeperConfig,
    cancel_token: CancellationToken,
) {
    info!(
        target: "chat.task.sweeper",
        interval_seconds = config.interval_seconds,
        inactivity_seconds = config.inactivity_seconds,
        "Starting inactivity sweeper"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(config.interval_seconds));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let cutoff = db::now_millis() - (config.inactivity_seconds as i64) * 1000;
                run_sweep(&db_pool, cutoff).await;
            }
            _ = cancel_token.cancelled() => {
                info!(target: "chat.task.sweeper", "Sweeper received shutdown signal, exiting");
                break;
            }
        }
    }
}

/// One sweep: removes every participant whose `last_status` is before
/// `cutoff` (epoch millis). Returns how many were removed.
pub async fn run_sweep(db_pool: &SqlitePool, cutoff: i64) -> usize {
    let stale: Vec<(String,)> = match sqlx::query_as(STALE_QUERY)
        .bind(cutoff)
        .fetch_all(db_pool)
        .await
    {
        Ok(stale) => stale,
        Err(e) => {
            error!(target: "chat.task.sweeper", error = %e, "Failed to query stale participants");
            return 0;
        }
    };

    let mut removed = 0;
    for (name,) in &stale {
        match retire(db_pool, name, cutoff).await {
            Ok(true) => removed += 1,
            Ok(false) => debug!(
                target: "chat.task.sweeper",
                participant = %name,
                "Participant came back before removal"
            ),
            Err(e) => error!(
                target: "chat.task.sweeper",
                participant = %name,
                error = %e,
                "Failed to remove participant"
            ),
        }
    }

    if removed > 0 {
        info!(target: "chat.task.sweeper", removed, "Removed inactive participants");
    }
    removed
}

async fn retire(db_pool: &SqlitePool, name: &str, cutoff: i64) -> sqlx::Result<bool> {
    let mut tx = db_pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM participants WHERE name=? AND last_status < ?")
        .bind(name)
        .bind(cutoff)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Ok(false);
    }

    db::insert_message(&mut *tx, name, BROADCAST, DEPARTED_TEXT, MessageKind::Status).await?;
    tx.commit().await?;
    Ok(true)
}
