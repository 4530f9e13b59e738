//! Owner resolution for user-owned resources.
//!
//! Every lookup walks the chain set -> workout exercise -> session over
//! active rows only, so a resource with any soft-deleted link resolves to
//! `None`, exactly like a missing one.

use repwise_core::set_consistency::SetKind;
use repwise_core::types::DbId;
use sqlx::PgPool;

pub struct OwnershipRepo;

impl OwnershipRepo {
    pub async fn session_owner(pool: &PgPool, session_id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> =
            sqlx::query_as("SELECT user_id FROM workout_sessions WHERE id = $1 AND NOT deleted")
                .bind(session_id)
                .fetch_optional(pool)
                .await?;
        Ok(row.map(|r| r.0))
    }

    pub async fn workout_exercise_owner(
        pool: &PgPool,
        workout_exercise_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "SELECT s.user_id
             FROM workout_exercises we
             JOIN workout_sessions s ON s.id = we.workout_session_id
             WHERE we.id = $1 AND NOT we.deleted AND NOT s.deleted",
        )
        .bind(workout_exercise_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| r.0))
    }

    pub async fn set_owner(
        pool: &PgPool,
        kind: SetKind,
        set_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let query = format!(
            "SELECT s.user_id
             FROM {} x
             JOIN workout_exercises we ON we.id = x.workout_exercise_id
             JOIN workout_sessions s ON s.id = we.workout_session_id
             WHERE x.id = $1 AND NOT x.deleted AND NOT we.deleted AND NOT s.deleted",
            set_table(kind)
        );
        let row: Option<(DbId,)> = sqlx::query_as(&query)
            .bind(set_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|r| r.0))
    }
}

fn set_table(kind: SetKind) -> &'static str {
    match kind {
        SetKind::Strength => "strength_sets",
        SetKind::Cardio => "cardio_sets",
        SetKind::Flexibility => "flexibility_sets",
    }
}
