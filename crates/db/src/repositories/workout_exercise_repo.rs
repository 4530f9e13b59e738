//! Repository for workout exercises (session entries).

use std::collections::HashMap;

use repwise_core::set_consistency::SetCounts;
use repwise_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::workout_exercise::{
    AddWorkoutExercise, UpdateWorkoutExercise, WorkoutExercise, WorkoutExerciseDetail,
};
use crate::repositories::exercise_repo::ExerciseRepo;
use crate::repositories::exercise_set_repo::ExerciseSetRepo;
use crate::repositories::soft_delete_repo::SoftDeleteEntity;
use crate::repositories::workout_session_repo::SET_TABLES;

const COLUMNS: &str = <WorkoutExercise as SoftDeleteEntity>::COLUMNS;

pub struct WorkoutExerciseRepo;

impl WorkoutExerciseRepo {
    /// Append an exercise to a session. Without an explicit `order_index`
    /// the entry goes after the last active one.
    pub async fn create(
        pool: &PgPool,
        session_id: DbId,
        input: &AddWorkoutExercise,
        actor: Option<&str>,
    ) -> Result<WorkoutExercise, sqlx::Error> {
        let query = format!(
            "INSERT INTO workout_exercises (workout_session_id, exercise_id, order_index, \
                 notes, created_by, updated_by)
             VALUES ($1, $2,
                 COALESCE($3, (SELECT COALESCE(MAX(order_index) + 1, 0) FROM workout_exercises
                               WHERE workout_session_id = $1 AND NOT deleted)),
                 $4, $5, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkoutExercise>(&query)
            .bind(session_id)
            .bind(input.exercise_id)
            .bind(input.order_index)
            .bind(&input.notes)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Active entries of a session in plan order.
    pub async fn list_by_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<WorkoutExercise>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workout_exercises
             WHERE workout_session_id = $1 AND NOT deleted
             ORDER BY order_index ASC, id ASC"
        );
        sqlx::query_as::<_, WorkoutExercise>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWorkoutExercise,
        actor: Option<&str>,
    ) -> Result<Option<WorkoutExercise>, sqlx::Error> {
        let query = format!(
            "UPDATE workout_exercises SET
                order_index = $3,
                notes = $4,
                updated_by = COALESCE($5, updated_by),
                version = version + 1
             WHERE id = $1 AND version = $2 AND NOT deleted
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkoutExercise>(&query)
            .bind(id)
            .bind(input.version)
            .bind(input.order_index)
            .bind(&input.notes)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Attach each entry's library exercise and active sets.
    pub async fn with_details(
        pool: &PgPool,
        entries: Vec<WorkoutExercise>,
    ) -> Result<Vec<WorkoutExerciseDetail>, sqlx::Error> {
        let entry_ids: Vec<DbId> = entries.iter().map(|e| e.id).collect();
        let mut exercise_ids: Vec<DbId> = entries.iter().map(|e| e.exercise_id).collect();
        exercise_ids.sort_unstable();
        exercise_ids.dedup();

        let exercises: HashMap<DbId, _> = ExerciseRepo::find_by_ids(pool, &exercise_ids)
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();

        let mut sets_by_entry: HashMap<DbId, Vec<_>> = HashMap::new();
        for (entry_id, set) in ExerciseSetRepo::list_for_workout_exercises(pool, &entry_ids).await? {
            sets_by_entry.entry(entry_id).or_default().push(set);
        }

        entries
            .into_iter()
            .map(|entry| {
                let exercise = exercises
                    .get(&entry.exercise_id)
                    .cloned()
                    .ok_or(sqlx::Error::RowNotFound)?;
                let sets = sets_by_entry.remove(&entry.id).unwrap_or_default();
                Ok(WorkoutExerciseDetail {
                    workout_exercise: entry,
                    exercise,
                    sets,
                })
            })
            .collect()
    }

    /// Active set counts per kind for one entry.
    pub async fn set_counts(pool: &PgPool, id: DbId) -> Result<SetCounts, sqlx::Error> {
        let row: (i64, i64, i64) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM strength_sets WHERE workout_exercise_id = $1 AND NOT deleted),
                (SELECT COUNT(*) FROM cardio_sets WHERE workout_exercise_id = $1 AND NOT deleted),
                (SELECT COUNT(*) FROM flexibility_sets WHERE workout_exercise_id = $1 AND NOT deleted)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(SetCounts {
            strength: row.0,
            cardio: row.1,
            flexibility: row.2,
        })
    }

    /// Soft-delete an entry and its active sets in one transaction.
    pub async fn soft_delete_cascade(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
        actor: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE workout_exercises SET deleted = true, deleted_at = $2, version = version + 1,
                updated_by = COALESCE($3, updated_by)
             WHERE id = $1 AND NOT deleted",
        )
        .bind(id)
        .bind(now)
        .bind(actor)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        for table in SET_TABLES {
            let query = format!(
                "UPDATE {table} SET deleted = true, deleted_at = $2, version = version + 1,
                    updated_by = COALESCE($3, updated_by)
                 WHERE workout_exercise_id = $1 AND NOT deleted"
            );
            sqlx::query(&query)
                .bind(id)
                .bind(now)
                .bind(actor)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
