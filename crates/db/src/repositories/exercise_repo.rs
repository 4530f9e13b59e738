//! Repository for the shared exercise library.
//!
//! Exercises are not soft-deletable: removing one is a hard delete that the
//! `workout_exercises` foreign key refuses while any entry references it.

use repwise_core::exercise::SEED_EXERCISES;
use repwise_core::pagination::{Page, PageRequest, Sort};
use repwise_core::types::{DbId, Version};
use sqlx::PgPool;

use crate::models::exercise::{CreateExercise, Exercise, ExerciseFilter, UpdateExercise};

const COLUMNS: &str = "id, name, description, exercise_type_id, muscle_group, difficulty, \
     image_url, version, created_by, updated_by, created_at, updated_at";

/// Columns the exercise search may sort by.
pub const SORTABLE: &[&str] = &["id", "name", "muscle_group", "difficulty", "created_at"];

/// Shared filter clause; `$1..$4` are the optional filters.
const FILTER: &str = "($1::SMALLINT IS NULL OR exercise_type_id = $1)
     AND ($2::TEXT IS NULL OR muscle_group = $2)
     AND ($3::TEXT IS NULL OR difficulty = $3)
     AND ($4::TEXT IS NULL OR name ILIKE '%' || $4 || '%' ESCAPE '\\')";

pub struct ExerciseRepo;

impl ExerciseRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateExercise,
        actor: Option<&str>,
    ) -> Result<Exercise, sqlx::Error> {
        let query = format!(
            "INSERT INTO exercises (name, description, exercise_type_id, muscle_group, \
                 difficulty, image_url, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Exercise>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.exercise_type.id())
            .bind(&input.muscle_group)
            .bind(&input.difficulty)
            .bind(&input.image_url)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Exercise>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exercises WHERE id = $1");
        sqlx::query_as::<_, Exercise>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch several exercises at once, in no particular order.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Exercise>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exercises WHERE id = ANY($1)");
        sqlx::query_as::<_, Exercise>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Filtered, paginated search. Defaults to name order.
    pub async fn search(
        pool: &PgPool,
        filter: &ExerciseFilter,
        request: PageRequest,
        sort: Option<&Sort>,
    ) -> Result<Page<Exercise>, sqlx::Error> {
        let order = sort.map_or_else(|| "name ASC, id ASC".to_string(), Sort::to_sql);
        let name = filter.name.as_deref().map(escape_like);
        let type_id = filter.exercise_type.map(|t| t.id());

        let query = format!(
            "SELECT {COLUMNS} FROM exercises WHERE {FILTER} ORDER BY {order} LIMIT $5 OFFSET $6"
        );
        let items = sqlx::query_as::<_, Exercise>(&query)
            .bind(type_id)
            .bind(&filter.muscle_group)
            .bind(&filter.difficulty)
            .bind(&name)
            .bind(request.size)
            .bind(request.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM exercises WHERE {FILTER}");
        let total: (i64,) = sqlx::query_as(&count_query)
            .bind(type_id)
            .bind(&filter.muscle_group)
            .bind(&filter.difficulty)
            .bind(&name)
            .fetch_one(pool)
            .await?;

        Ok(Page::new(items, request, total.0))
    }

    /// Replace an exercise if `input.version` is current. `None` means absent
    /// or stale; use [`ExerciseRepo::current_version`] to tell them apart.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateExercise,
        actor: Option<&str>,
    ) -> Result<Option<Exercise>, sqlx::Error> {
        let query = format!(
            "UPDATE exercises SET
                name = $3,
                description = $4,
                exercise_type_id = $5,
                muscle_group = $6,
                difficulty = $7,
                image_url = $8,
                updated_by = COALESCE($9, updated_by),
                version = version + 1
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Exercise>(&query)
            .bind(id)
            .bind(input.version)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.exercise_type.id())
            .bind(&input.muscle_group)
            .bind(&input.difficulty)
            .bind(&input.image_url)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    pub async fn current_version(pool: &PgPool, id: DbId) -> Result<Option<Version>, sqlx::Error> {
        let row: Option<(Version,)> = sqlx::query_as("SELECT version FROM exercises WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|r| r.0))
    }

    /// Whether any workout entry, deleted or not, references the exercise.
    pub async fn is_referenced(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM workout_exercises WHERE exercise_id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Permanently delete an exercise. Fails with a foreign-key violation
    /// while it is referenced.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM exercises")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Insert the built-in library if the table is empty. Returns the number
    /// of rows inserted.
    pub async fn seed_defaults(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM exercises")
            .fetch_one(&mut *tx)
            .await?;
        if existing.0 > 0 {
            return Ok(0);
        }

        let mut inserted = 0;
        for seed in SEED_EXERCISES {
            let result = sqlx::query(
                "INSERT INTO exercises (name, description, exercise_type_id, muscle_group, \
                     difficulty, created_by, updated_by)
                 VALUES ($1, $2, $3, $4, $5, 'system', 'system')
                 ON CONFLICT (name) DO NOTHING",
            )
            .bind(seed.name)
            .bind(seed.description)
            .bind(seed.exercise_type.id())
            .bind(seed.muscle_group)
            .bind(seed.difficulty)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
