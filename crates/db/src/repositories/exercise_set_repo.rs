//! Repositories for the three set tables.
//!
//! Reads, soft delete and restore go through
//! [`SoftDeleteRepo`](crate::repositories::soft_delete_repo::SoftDeleteRepo);
//! these add the per-kind inserts, versioned updates, and the listings keyed
//! by workout exercise.

use repwise_core::types::DbId;
use sqlx::PgPool;

use crate::models::exercise_set::{
    CardioSet, CreateCardioSet, CreateFlexibilitySet, CreateStrengthSet, ExerciseSet,
    FlexibilitySet, StrengthSet, UpdateCardioSet, UpdateFlexibilitySet, UpdateStrengthSet,
};
use crate::repositories::soft_delete_repo::SoftDeleteEntity;

/// Active rows of `E` belonging to any of `workout_exercise_ids`.
async fn list_for<E: SoftDeleteEntity>(
    pool: &PgPool,
    workout_exercise_ids: &[DbId],
) -> Result<Vec<E>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM {} WHERE workout_exercise_id = ANY($1) AND NOT deleted
         ORDER BY workout_exercise_id, set_number, id",
        E::COLUMNS,
        E::TABLE
    );
    sqlx::query_as::<_, E>(&query)
        .bind(workout_exercise_ids)
        .fetch_all(pool)
        .await
}

// ---------------------------------------------------------------------------
// Strength
// ---------------------------------------------------------------------------

pub struct StrengthSetRepo;

impl StrengthSetRepo {
    pub async fn create(
        pool: &PgPool,
        workout_exercise_id: DbId,
        input: &CreateStrengthSet,
        actor: Option<&str>,
    ) -> Result<StrengthSet, sqlx::Error> {
        let query = format!(
            "INSERT INTO strength_sets (workout_exercise_id, set_number, reps, weight, \
                 rest_seconds, completed, notes, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING {}",
            StrengthSet::COLUMNS
        );
        sqlx::query_as::<_, StrengthSet>(&query)
            .bind(workout_exercise_id)
            .bind(input.set_number)
            .bind(input.reps)
            .bind(input.weight)
            .bind(input.rest_seconds)
            .bind(input.completed)
            .bind(&input.notes)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    pub async fn list_by_workout_exercise(
        pool: &PgPool,
        workout_exercise_id: DbId,
    ) -> Result<Vec<StrengthSet>, sqlx::Error> {
        list_for::<StrengthSet>(pool, &[workout_exercise_id]).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStrengthSet,
        actor: Option<&str>,
    ) -> Result<Option<StrengthSet>, sqlx::Error> {
        let query = format!(
            "UPDATE strength_sets SET
                set_number = $3, reps = $4, weight = $5, rest_seconds = $6,
                completed = $7, notes = $8,
                updated_by = COALESCE($9, updated_by),
                version = version + 1
             WHERE id = $1 AND version = $2 AND NOT deleted
             RETURNING {}",
            StrengthSet::COLUMNS
        );
        sqlx::query_as::<_, StrengthSet>(&query)
            .bind(id)
            .bind(input.version)
            .bind(input.set_number)
            .bind(input.reps)
            .bind(input.weight)
            .bind(input.rest_seconds)
            .bind(input.completed)
            .bind(&input.notes)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// Cardio
// ---------------------------------------------------------------------------

pub struct CardioSetRepo;

impl CardioSetRepo {
    pub async fn create(
        pool: &PgPool,
        workout_exercise_id: DbId,
        input: &CreateCardioSet,
        actor: Option<&str>,
    ) -> Result<CardioSet, sqlx::Error> {
        let query = format!(
            "INSERT INTO cardio_sets (workout_exercise_id, set_number, duration_seconds, \
                 distance, distance_unit, rest_seconds, completed, notes, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING {}",
            CardioSet::COLUMNS
        );
        sqlx::query_as::<_, CardioSet>(&query)
            .bind(workout_exercise_id)
            .bind(input.set_number)
            .bind(input.duration_seconds)
            .bind(input.distance)
            .bind(&input.distance_unit)
            .bind(input.rest_seconds)
            .bind(input.completed)
            .bind(&input.notes)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    pub async fn list_by_workout_exercise(
        pool: &PgPool,
        workout_exercise_id: DbId,
    ) -> Result<Vec<CardioSet>, sqlx::Error> {
        list_for::<CardioSet>(pool, &[workout_exercise_id]).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCardioSet,
        actor: Option<&str>,
    ) -> Result<Option<CardioSet>, sqlx::Error> {
        let query = format!(
            "UPDATE cardio_sets SET
                set_number = $3, duration_seconds = $4, distance = $5, distance_unit = $6,
                rest_seconds = $7, completed = $8, notes = $9,
                updated_by = COALESCE($10, updated_by),
                version = version + 1
             WHERE id = $1 AND version = $2 AND NOT deleted
             RETURNING {}",
            CardioSet::COLUMNS
        );
        sqlx::query_as::<_, CardioSet>(&query)
            .bind(id)
            .bind(input.version)
            .bind(input.set_number)
            .bind(input.duration_seconds)
            .bind(input.distance)
            .bind(&input.distance_unit)
            .bind(input.rest_seconds)
            .bind(input.completed)
            .bind(&input.notes)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// Flexibility
// ---------------------------------------------------------------------------

pub struct FlexibilitySetRepo;

impl FlexibilitySetRepo {
    pub async fn create(
        pool: &PgPool,
        workout_exercise_id: DbId,
        input: &CreateFlexibilitySet,
        actor: Option<&str>,
    ) -> Result<FlexibilitySet, sqlx::Error> {
        let query = format!(
            "INSERT INTO flexibility_sets (workout_exercise_id, set_number, duration_seconds, \
                 stretch_type, intensity, rest_seconds, completed, notes, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING {}",
            FlexibilitySet::COLUMNS
        );
        sqlx::query_as::<_, FlexibilitySet>(&query)
            .bind(workout_exercise_id)
            .bind(input.set_number)
            .bind(input.duration_seconds)
            .bind(&input.stretch_type)
            .bind(input.intensity)
            .bind(input.rest_seconds)
            .bind(input.completed)
            .bind(&input.notes)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    pub async fn list_by_workout_exercise(
        pool: &PgPool,
        workout_exercise_id: DbId,
    ) -> Result<Vec<FlexibilitySet>, sqlx::Error> {
        list_for::<FlexibilitySet>(pool, &[workout_exercise_id]).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFlexibilitySet,
        actor: Option<&str>,
    ) -> Result<Option<FlexibilitySet>, sqlx::Error> {
        let query = format!(
            "UPDATE flexibility_sets SET
                set_number = $3, duration_seconds = $4, stretch_type = $5, intensity = $6,
                rest_seconds = $7, completed = $8, notes = $9,
                updated_by = COALESCE($10, updated_by),
                version = version + 1
             WHERE id = $1 AND version = $2 AND NOT deleted
             RETURNING {}",
            FlexibilitySet::COLUMNS
        );
        sqlx::query_as::<_, FlexibilitySet>(&query)
            .bind(id)
            .bind(input.version)
            .bind(input.set_number)
            .bind(input.duration_seconds)
            .bind(&input.stretch_type)
            .bind(input.intensity)
            .bind(input.rest_seconds)
            .bind(input.completed)
            .bind(&input.notes)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// All kinds
// ---------------------------------------------------------------------------

pub struct ExerciseSetRepo;

impl ExerciseSetRepo {
    /// Active sets of every kind for the given entries, as
    /// `(workout_exercise_id, set)` pairs ordered by set number.
    pub async fn list_for_workout_exercises(
        pool: &PgPool,
        workout_exercise_ids: &[DbId],
    ) -> Result<Vec<(DbId, ExerciseSet)>, sqlx::Error> {
        if workout_exercise_ids.is_empty() {
            return Ok(Vec::new());
        }
        let strength = list_for::<StrengthSet>(pool, workout_exercise_ids).await?;
        let cardio = list_for::<CardioSet>(pool, workout_exercise_ids).await?;
        let flexibility = list_for::<FlexibilitySet>(pool, workout_exercise_ids).await?;

        let mut all: Vec<(DbId, ExerciseSet)> = strength
            .into_iter()
            .map(|s| (s.workout_exercise_id, s.into()))
            .chain(cardio.into_iter().map(|s| (s.workout_exercise_id, s.into())))
            .chain(flexibility.into_iter().map(|s| (s.workout_exercise_id, s.into())))
            .collect();
        all.sort_by_key(|(we_id, set)| (*we_id, set.set_number()));
        Ok(all)
    }
}
