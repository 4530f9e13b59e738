//! Periodic purge of long-deleted rows.
//!
//! Rows soft-deleted more than `SOFT_DELETE_RETENTION_DAYS` ago are removed
//! for good, children before parents: sets, then workout exercises, then
//! sessions, then users. Each pass also drops idle rate-limit buckets.

use std::time::Duration;

use repwise_core::types::Timestamp;
use repwise_db::models::exercise_set::{CardioSet, FlexibilitySet, StrengthSet};
use repwise_db::models::user::User;
use repwise_db::models::workout_exercise::WorkoutExercise;
use repwise_db::models::workout_session::WorkoutSession;
use repwise_db::repositories::{SoftDeleteEntity, SoftDeleteRepo};
use serde::Serialize;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Rate-limit buckets untouched this long are dropped.
const BUCKET_IDLE: Duration = Duration::from_secs(3600);

/// Rows removed per table by one pass.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub strength_sets: u64,
    pub cardio_sets: u64,
    pub flexibility_sets: u64,
    pub workout_exercises: u64,
    pub workout_sessions: u64,
    pub users: u64,
}

impl PurgeReport {
    pub fn total(&self) -> u64 {
        self.strength_sets
            + self.cardio_sets
            + self.flexibility_sets
            + self.workout_exercises
            + self.workout_sessions
            + self.users
    }
}

async fn purge<E: SoftDeleteEntity>(
    pool: &PgPool,
    retention_days: i64,
    now: Timestamp,
) -> Result<u64, sqlx::Error> {
    let deleted = SoftDeleteRepo::<E>::permanently_delete_older_than(pool, retention_days, now).await?;
    if deleted > 0 {
        tracing::debug!(table = E::TABLE, deleted, "Retention: purged rows");
    }
    Ok(deleted)
}

/// One retention pass in foreign-key-safe order.
pub async fn purge_expired(
    pool: &PgPool,
    retention_days: i64,
    now: Timestamp,
) -> Result<PurgeReport, sqlx::Error> {
    Ok(PurgeReport {
        strength_sets: purge::<StrengthSet>(pool, retention_days, now).await?,
        cardio_sets: purge::<CardioSet>(pool, retention_days, now).await?,
        flexibility_sets: purge::<FlexibilitySet>(pool, retention_days, now).await?,
        workout_exercises: purge::<WorkoutExercise>(pool, retention_days, now).await?,
        workout_sessions: purge::<WorkoutSession>(pool, retention_days, now).await?,
        users: purge::<User>(pool, retention_days, now).await?,
    })
}

/// Run the retention loop until `cancel` is triggered.
pub async fn run(state: AppState, cancel: CancellationToken) {
    let retention_days = state.config.soft_delete_retention_days;
    let interval_secs = state.config.purge_interval_secs.max(1);

    tracing::info!(retention_days, interval_secs, "Retention job started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Retention job stopping");
                break;
            }
            _ = interval.tick() => {
                match purge_expired(&state.pool, retention_days, state.clock.now()).await {
                    Ok(report) if report.total() > 0 => {
                        tracing::info!(
                            strength_sets = report.strength_sets,
                            cardio_sets = report.cardio_sets,
                            flexibility_sets = report.flexibility_sets,
                            workout_exercises = report.workout_exercises,
                            workout_sessions = report.workout_sessions,
                            users = report.users,
                            "Retention: purged expired soft-deleted rows"
                        );
                    }
                    Ok(_) => tracing::debug!("Retention: no rows to purge"),
                    Err(e) => tracing::error!(error = %e, "Retention: purge failed"),
                }

                let pruned = state.rate_limiter.prune_idle(BUCKET_IDLE);
                if pruned > 0 {
                    tracing::debug!(pruned, "Retention: dropped idle rate-limit buckets");
                }
            }
        }
    }
}
