//! Repository for workout sessions.
//!
//! Soft delete and restore cascade through the session's workout exercises
//! and their sets inside one transaction, so a session never disappears
//! while its children stay visible (or the reverse).

use repwise_core::pagination::{Page, PageRequest, Sort};
use repwise_core::status::WorkoutStatus;
use repwise_core::types::{DbId, Timestamp, Version};
use repwise_core::workout_status::SessionTimes;
use sqlx::PgPool;

use crate::models::workout_session::{
    CreateWorkoutSession, UpdateWorkoutSession, WorkoutSession, WorkoutSessionDetail,
};
use crate::repositories::soft_delete_repo::{order_by, SoftDeleteEntity};
use crate::repositories::workout_exercise_repo::WorkoutExerciseRepo;

const COLUMNS: &str = <WorkoutSession as SoftDeleteEntity>::COLUMNS;

/// Set tables, children of `workout_exercises`.
pub(crate) const SET_TABLES: &[&str] = &["strength_sets", "cardio_sets", "flexibility_sets"];

pub struct WorkoutSessionRepo;

impl WorkoutSessionRepo {
    /// Insert a session and its initial exercises atomically.
    ///
    /// Exercises without an explicit `order_index` take their position in
    /// the input list.
    pub async fn create_with_exercises(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateWorkoutSession,
        actor: Option<&str>,
    ) -> Result<WorkoutSession, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO workout_sessions (user_id, name, description, scheduled_date, \
                 started_at, completed_at, duration_minutes, notes, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, WorkoutSession>(&query)
            .bind(user_id)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.scheduled_date)
            .bind(input.started_at)
            .bind(input.completed_at)
            .bind(input.duration_minutes)
            .bind(&input.notes)
            .bind(actor)
            .fetch_one(&mut *tx)
            .await?;

        for (position, entry) in input.exercises.iter().enumerate() {
            let order_index = entry.order_index.unwrap_or(position as i32);
            sqlx::query(
                "INSERT INTO workout_exercises (workout_session_id, exercise_id, order_index, \
                     notes, created_by, updated_by)
                 VALUES ($1, $2, $3, $4, $5, $5)",
            )
            .bind(session.id)
            .bind(entry.exercise_id)
            .bind(order_index)
            .bind(&entry.notes)
            .bind(actor)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(session)
    }

    /// An active session with its active exercises and sets.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WorkoutSessionDetail>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workout_sessions WHERE id = $1 AND NOT deleted");
        let Some(session) = sqlx::query_as::<_, WorkoutSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };
        let entries = WorkoutExerciseRepo::list_by_session(pool, id).await?;
        let exercises = WorkoutExerciseRepo::with_details(pool, entries).await?;
        Ok(Some(WorkoutSessionDetail { session, exercises }))
    }

    /// One page of a user's active sessions, optionally filtered by status.
    pub async fn list_page_for_user(
        pool: &PgPool,
        user_id: DbId,
        status: Option<WorkoutStatus>,
        request: PageRequest,
        sort: Option<&Sort>,
    ) -> Result<Page<WorkoutSession>, sqlx::Error> {
        Self::page_where(pool, "NOT deleted", user_id, status, request, sort).await
    }

    /// One page of a user's sessions including deleted ones.
    pub async fn list_page_for_user_including_deleted(
        pool: &PgPool,
        user_id: DbId,
        status: Option<WorkoutStatus>,
        request: PageRequest,
        sort: Option<&Sort>,
    ) -> Result<Page<WorkoutSession>, sqlx::Error> {
        Self::page_where(pool, "true", user_id, status, request, sort).await
    }

    /// One page of a user's deleted sessions, most recently deleted first.
    pub async fn list_deleted_for_user(
        pool: &PgPool,
        user_id: DbId,
        request: PageRequest,
    ) -> Result<Page<WorkoutSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workout_sessions
             WHERE user_id = $1 AND deleted
             ORDER BY deleted_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, WorkoutSession>(&query)
            .bind(user_id)
            .bind(request.size)
            .bind(request.offset())
            .fetch_all(pool)
            .await?;
        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM workout_sessions WHERE user_id = $1 AND deleted")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(Page::new(items, request, total.0))
    }

    /// `visibility` is a fixed SQL predicate chosen by the caller, never
    /// user input.
    async fn page_where(
        pool: &PgPool,
        visibility: &str,
        user_id: DbId,
        status: Option<WorkoutStatus>,
        request: PageRequest,
        sort: Option<&Sort>,
    ) -> Result<Page<WorkoutSession>, sqlx::Error> {
        let filter = format!(
            "{visibility} AND user_id = $1 AND ($2::SMALLINT IS NULL OR status_id = $2)"
        );
        let status_id = status.map(|s| s.id());

        let query = format!(
            "SELECT {COLUMNS} FROM workout_sessions WHERE {filter}
             ORDER BY {} LIMIT $3 OFFSET $4",
            order_by::<WorkoutSession>(sort)
        );
        let items = sqlx::query_as::<_, WorkoutSession>(&query)
            .bind(user_id)
            .bind(status_id)
            .bind(request.size)
            .bind(request.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM workout_sessions WHERE {filter}");
        let total: (i64,) = sqlx::query_as(&count_query)
            .bind(user_id)
            .bind(status_id)
            .fetch_one(pool)
            .await?;

        Ok(Page::new(items, request, total.0))
    }

    /// Replace the editable fields if `input.version` is current.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWorkoutSession,
        actor: Option<&str>,
    ) -> Result<Option<WorkoutSession>, sqlx::Error> {
        let query = format!(
            "UPDATE workout_sessions SET
                name = $3,
                description = $4,
                scheduled_date = $5,
                started_at = $6,
                completed_at = $7,
                duration_minutes = $8,
                notes = $9,
                updated_by = COALESCE($10, updated_by),
                version = version + 1
             WHERE id = $1 AND version = $2 AND NOT deleted
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkoutSession>(&query)
            .bind(id)
            .bind(input.version)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.scheduled_date)
            .bind(input.started_at)
            .bind(input.completed_at)
            .bind(input.duration_minutes)
            .bind(&input.notes)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Store a status transition and the timestamps it implies.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        expected_version: Version,
        status: WorkoutStatus,
        times: SessionTimes,
        actor: Option<&str>,
    ) -> Result<Option<WorkoutSession>, sqlx::Error> {
        let query = format!(
            "UPDATE workout_sessions SET
                status_id = $3,
                started_at = $4,
                completed_at = $5,
                duration_minutes = $6,
                updated_by = COALESCE($7, updated_by),
                version = version + 1
             WHERE id = $1 AND version = $2 AND NOT deleted
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkoutSession>(&query)
            .bind(id)
            .bind(expected_version)
            .bind(status.id())
            .bind(times.started_at)
            .bind(times.completed_at)
            .bind(times.duration_minutes)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a session, its workout exercises and their sets, all
    /// stamped with the same `now`. Returns `false` if the session was not
    /// active.
    pub async fn soft_delete_cascade(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
        actor: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE workout_sessions SET deleted = true, deleted_at = $2, version = version + 1,
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
                 WHERE NOT deleted AND workout_exercise_id IN (
                     SELECT id FROM workout_exercises WHERE workout_session_id = $1 AND NOT deleted
                 )"
            );
            sqlx::query(&query)
                .bind(id)
                .bind(now)
                .bind(actor)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            "UPDATE workout_exercises SET deleted = true, deleted_at = $2, version = version + 1,
                updated_by = COALESCE($3, updated_by)
             WHERE workout_session_id = $1 AND NOT deleted",
        )
        .bind(id)
        .bind(now)
        .bind(actor)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Restore a deleted session together with the children that were
    /// deleted in the same cascade (same `deleted_at`). Children deleted
    /// individually before the session stay deleted.
    pub async fn restore_cascade(
        pool: &PgPool,
        id: DbId,
        actor: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let stamp: Option<(Timestamp,)> = sqlx::query_as(
            "SELECT deleted_at FROM workout_sessions WHERE id = $1 AND deleted FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((deleted_at,)) = stamp else {
            return Ok(false);
        };

        sqlx::query(
            "UPDATE workout_sessions SET deleted = false, deleted_at = NULL,
                version = version + 1, updated_by = COALESCE($2, updated_by)
             WHERE id = $1",
        )
        .bind(id)
        .bind(actor)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE workout_exercises SET deleted = false, deleted_at = NULL,
                version = version + 1, updated_by = COALESCE($3, updated_by)
             WHERE workout_session_id = $1 AND deleted AND deleted_at = $2",
        )
        .bind(id)
        .bind(deleted_at)
        .bind(actor)
        .execute(&mut *tx)
        .await?;

        for table in SET_TABLES {
            let query = format!(
                "UPDATE {table} SET deleted = false, deleted_at = NULL,
                    version = version + 1, updated_by = COALESCE($3, updated_by)
                 WHERE deleted AND deleted_at = $2 AND workout_exercise_id IN (
                     SELECT id FROM workout_exercises WHERE workout_session_id = $1 AND NOT deleted
                 )"
            );
            sqlx::query(&query)
                .bind(id)
                .bind(deleted_at)
                .bind(actor)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
