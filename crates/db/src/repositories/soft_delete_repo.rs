//! Generic soft-delete data access.
//!
//! Every soft-deletable table carries `deleted`, `deleted_at` and `version`.
//! [`SoftDeleteRepo`] implements the shared contract once per entity type:
//! the plain read paths (`find_by_id`, `list*`, `count`, `exists`) only ever
//! see active rows, and deleted rows are reachable only through the
//! `*_including_deleted` / `*_deleted` entry points.

use std::marker::PhantomData;

use chrono::Duration;
use repwise_core::error::CoreError;
use repwise_core::pagination::{Page, PageRequest, Sort};
use repwise_core::types::{DbId, Timestamp, Version};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

/// A model backed by a soft-deletable table.
pub trait SoftDeleteEntity: for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin + 'static {
    /// Table name.
    const TABLE: &'static str;
    /// Entity name used in error messages.
    const ENTITY: &'static str;
    /// Column list selected into the model.
    const COLUMNS: &'static str;
    /// Columns a caller may sort by.
    const SORTABLE: &'static [&'static str];
    /// `ORDER BY` body used when no sort is requested.
    const DEFAULT_ORDER: &'static str = "id ASC";
}

/// The shared soft-delete contract for entity `E`.
pub struct SoftDeleteRepo<E>(PhantomData<E>);

impl<E: SoftDeleteEntity> SoftDeleteRepo<E> {
    // ── Reads ─────────────────────────────────────────────────────────

    /// Find an active row by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<E>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1 AND NOT deleted",
            E::COLUMNS,
            E::TABLE
        );
        sqlx::query_as::<_, E>(&query).bind(id).fetch_optional(pool).await
    }

    /// Find a row by id whether or not it is deleted.
    pub async fn find_by_id_including_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<E>, sqlx::Error> {
        let query = format!("SELECT {} FROM {} WHERE id = $1", E::COLUMNS, E::TABLE);
        sqlx::query_as::<_, E>(&query).bind(id).fetch_optional(pool).await
    }

    /// All active rows in default order.
    pub async fn list(pool: &PgPool) -> Result<Vec<E>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE NOT deleted ORDER BY {}",
            E::COLUMNS,
            E::TABLE,
            E::DEFAULT_ORDER
        );
        sqlx::query_as::<_, E>(&query).fetch_all(pool).await
    }

    /// All active rows in the requested order.
    pub async fn list_sorted(pool: &PgPool, sort: &Sort) -> Result<Vec<E>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE NOT deleted ORDER BY {}",
            E::COLUMNS,
            E::TABLE,
            order_by::<E>(Some(sort))
        );
        sqlx::query_as::<_, E>(&query).fetch_all(pool).await
    }

    /// One page of active rows. The total comes from a count with the same
    /// active-only filter.
    pub async fn list_page(
        pool: &PgPool,
        request: PageRequest,
        sort: Option<&Sort>,
    ) -> Result<Page<E>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE NOT deleted ORDER BY {} LIMIT $1 OFFSET $2",
            E::COLUMNS,
            E::TABLE,
            order_by::<E>(sort)
        );
        let items = sqlx::query_as::<_, E>(&query)
            .bind(request.size)
            .bind(request.offset())
            .fetch_all(pool)
            .await?;
        let total = Self::count(pool).await?;
        Ok(Page::new(items, request, total))
    }

    /// Every row, deleted or not.
    pub async fn list_including_deleted(pool: &PgPool) -> Result<Vec<E>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} ORDER BY {}",
            E::COLUMNS,
            E::TABLE,
            E::DEFAULT_ORDER
        );
        sqlx::query_as::<_, E>(&query).fetch_all(pool).await
    }

    /// Only deleted rows, most recently deleted first.
    pub async fn list_deleted(pool: &PgPool) -> Result<Vec<E>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE deleted ORDER BY deleted_at DESC, id DESC",
            E::COLUMNS,
            E::TABLE
        );
        sqlx::query_as::<_, E>(&query).fetch_all(pool).await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {} WHERE NOT deleted", E::TABLE);
        let row: (i64,) = sqlx::query_as(&query).fetch_one(pool).await?;
        Ok(row.0)
    }

    pub async fn count_including_deleted(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {}", E::TABLE);
        let row: (i64,) = sqlx::query_as(&query).fetch_one(pool).await?;
        Ok(row.0)
    }

    pub async fn count_deleted(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {} WHERE deleted", E::TABLE);
        let row: (i64,) = sqlx::query_as(&query).fetch_one(pool).await?;
        Ok(row.0)
    }

    /// Whether an active row with `id` exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1 AND NOT deleted)",
            E::TABLE
        );
        let row: (bool,) = sqlx::query_as(&query).bind(id).fetch_one(pool).await?;
        Ok(row.0)
    }

    /// Version of the active row, `None` when absent or deleted.
    pub async fn current_version(pool: &PgPool, id: DbId) -> Result<Option<Version>, sqlx::Error> {
        let query = format!(
            "SELECT version FROM {} WHERE id = $1 AND NOT deleted",
            E::TABLE
        );
        let row: Option<(Version,)> = sqlx::query_as(&query).bind(id).fetch_optional(pool).await?;
        Ok(row.map(|r| r.0))
    }

    /// Explain a versioned write that matched no row: the row is either gone
    /// (`NotFound`) or was written by someone else first (`OptimisticLock`).
    pub async fn write_miss(
        pool: &PgPool,
        id: DbId,
        expected_version: Version,
    ) -> Result<CoreError, sqlx::Error> {
        Ok(match Self::current_version(pool, id).await? {
            None => CoreError::NotFound {
                entity: E::ENTITY,
                id,
            },
            Some(current_version) => CoreError::OptimisticLock {
                entity: E::ENTITY,
                id,
                expected_version,
                current_version,
            },
        })
    }

    // ── Writes ────────────────────────────────────────────────────────

    /// Mark an active row deleted at `now`. Returns `false` when the row is
    /// absent or already deleted, leaving its state untouched.
    pub async fn soft_delete(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
        actor: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET deleted = true, deleted_at = $2, version = version + 1,
                updated_by = COALESCE($3, updated_by)
             WHERE id = $1 AND NOT deleted",
            E::TABLE
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(now)
            .bind(actor)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear the deleted flag. Returns `false` unless the row was deleted.
    pub async fn restore(pool: &PgPool, id: DbId, actor: Option<&str>) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET deleted = false, deleted_at = NULL, version = version + 1,
                updated_by = COALESCE($2, updated_by)
             WHERE id = $1 AND deleted",
            E::TABLE
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(actor)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Physically remove a row, deleted or not. Irreversible.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove rows soft-deleted more than `days` days before `now`.
    pub async fn permanently_delete_older_than(
        pool: &PgPool,
        days: i64,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let cutoff = now - Duration::days(days);
        let query = format!(
            "DELETE FROM {} WHERE deleted AND deleted_at < $1",
            E::TABLE
        );
        let result = sqlx::query(&query).bind(cutoff).execute(pool).await?;
        Ok(result.rows_affected())
    }
}

/// `ORDER BY` body for `sort`, falling back to the entity default when the
/// sort is absent or names a column outside the entity's allow-list.
pub(crate) fn order_by<E: SoftDeleteEntity>(sort: Option<&Sort>) -> String {
    match sort {
        Some(sort) if E::SORTABLE.contains(&sort.field()) => sort.to_sql(),
        Some(sort) => {
            tracing::warn!(
                entity = E::ENTITY,
                field = sort.field(),
                "Ignoring sort on a column outside the allow-list"
            );
            E::DEFAULT_ORDER.to_string()
        }
        None => E::DEFAULT_ORDER.to_string(),
    }
}
