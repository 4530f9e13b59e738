//! Repository for the `users` table.
//!
//! Generic soft-delete operations come from
//! [`SoftDeleteRepo<User>`](crate::repositories::soft_delete_repo::SoftDeleteRepo).

use repwise_core::roles::UserRole;
use repwise_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateProfile, User};
use crate::repositories::soft_delete_repo::SoftDeleteEntity;

const COLUMNS: &str = <User as SoftDeleteEntity>::COLUMNS;

/// Provisioned usernames never exceed this many characters before a suffix.
const USERNAME_STEM_MAX: usize = 40;

/// Attempts at finding a free `stem_N` username before giving up.
const USERNAME_ATTEMPTS: u32 = 50;

pub struct UserRepo;

impl UserRepo {
    /// Insert a new user.
    pub async fn create(
        pool: &PgPool,
        input: &CreateUser,
        actor: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (subject, email, username, display_name, role_id, \
                 email_verified, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.subject)
            .bind(&input.email)
            .bind(&input.username)
            .bind(&input.display_name)
            .bind(input.role.id())
            .bind(input.email_verified)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find a user by identity-provider subject, including deleted users so
    /// the caller can tell "deactivated" from "never seen".
    pub async fn find_by_subject(pool: &PgPool, subject: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE subject = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(subject)
            .fetch_optional(pool)
            .await
    }

    /// Return the user for `subject`, creating it on first sight.
    ///
    /// The username is derived from the email's local part, with a numeric
    /// suffix appended when that name is taken. `email_verified` is refreshed
    /// from the identity on every call.
    pub async fn upsert_from_identity(
        pool: &PgPool,
        subject: &str,
        email: &str,
        email_verified: bool,
    ) -> Result<User, sqlx::Error> {
        if let Some(user) = Self::find_by_subject(pool, subject).await? {
            if user.email_verified == email_verified {
                return Ok(user);
            }
            let query = format!(
                "UPDATE users SET email_verified = $2, version = version + 1, updated_by = subject \
                 WHERE id = $1 RETURNING {COLUMNS}"
            );
            return sqlx::query_as::<_, User>(&query)
                .bind(user.id)
                .bind(email_verified)
                .fetch_one(pool)
                .await;
        }

        let username = Self::free_username(pool, &username_stem(email)).await?;
        let query = format!(
            "INSERT INTO users (subject, email, username, email_verified, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $1, $1)
             ON CONFLICT (subject) DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, User>(&query)
            .bind(subject)
            .bind(email)
            .bind(&username)
            .bind(email_verified)
            .fetch_optional(pool)
            .await?;

        match inserted {
            Some(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "Provisioned user");
                Ok(user)
            }
            // A concurrent request provisioned the same subject first.
            None => Self::find_by_subject(pool, subject)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    /// First of `stem`, `stem_1`, `stem_2`, ... not already taken.
    async fn free_username(pool: &PgPool, stem: &str) -> Result<String, sqlx::Error> {
        if !Self::username_exists(pool, stem).await? {
            return Ok(stem.to_string());
        }
        for n in 1..=USERNAME_ATTEMPTS {
            let candidate = format!("{stem}_{n}");
            if !Self::username_exists(pool, &candidate).await? {
                return Ok(candidate);
            }
        }
        let suffix = rand::random::<u32>() % 1_000_000;
        Ok(format!("{stem}_{suffix}"))
    }

    /// Whether any user, deleted or not, holds `username` (case-insensitive).
    pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))")
                .bind(username)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Whether any user, deleted or not, holds `email` (case-insensitive).
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Replace username and display name if `input.version` is current.
    ///
    /// Returns `None` when the user is absent, deleted, or the version is
    /// stale.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
        actor: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                username = $3,
                display_name = $4,
                updated_by = COALESCE($5, updated_by),
                version = version + 1
             WHERE id = $1 AND version = $2 AND NOT deleted
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.version)
            .bind(&input.username)
            .bind(&input.display_name)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Set the stored role to the one granted by the identity provider.
    pub async fn sync_role(pool: &PgPool, id: DbId, role: UserRole) -> Result<User, sqlx::Error> {
        let query = format!(
            "UPDATE users SET role_id = $2, version = version + 1, updated_by = subject \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(role.id())
            .fetch_one(pool)
            .await
    }
}

/// Username candidate from an email's local part: only `[a-zA-Z0-9_]`,
/// at least 3 and at most 40 characters.
pub fn username_stem(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let mut stem: String = local
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(USERNAME_STEM_MAX)
        .collect();
    if stem.trim_matches('_').is_empty() {
        stem = "user".to_string();
    }
    while stem.len() < 3 {
        stem.push('_');
    }
    stem
}
