//! User entity model and DTOs.

use repwise_core::roles::UserRole;
use repwise_core::types::{DbId, Timestamp, Version};
use repwise_core::validation::USERNAME_RE;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::repositories::soft_delete_repo::SoftDeleteEntity;

/// A user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    /// Identity-provider subject (`sub` claim).
    pub subject: String,
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    #[sqlx(rename = "role_id", try_from = "i16")]
    pub role: UserRole,
    pub email_verified: bool,
    pub deleted: bool,
    pub deleted_at: Option<Timestamp>,
    pub version: Version,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SoftDeleteEntity for User {
    const TABLE: &'static str = "users";
    const ENTITY: &'static str = "User";
    const COLUMNS: &'static str = "id, subject, email, username, display_name, role_id, \
         email_verified, deleted, deleted_at, version, created_by, updated_by, \
         created_at, updated_at";
    const SORTABLE: &'static [&'static str] = &["id", "username", "email", "created_at"];
}

/// Internal DTO for inserting a user. Identity fields come from the verified
/// token, never from a request body.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub subject: String,
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    pub role: UserRole,
    pub email_verified: bool,
}

/// Body of `POST /users`: explicit profile registration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(path = *USERNAME_RE, message = "Username may only contain letters, digits and underscores")
    )]
    pub username: String,
    #[validate(length(max = 100, message = "Display name cannot exceed 100 characters"))]
    pub display_name: Option<String>,
}

/// Body of `PUT /users/me`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(path = *USERNAME_RE, message = "Username may only contain letters, digits and underscores")
    )]
    pub username: String,
    #[validate(length(max = 100, message = "Display name cannot exceed 100 characters"))]
    pub display_name: Option<String>,
    pub version: Version,
}

/// Response of the username/email existence checks.
#[derive(Debug, Clone, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}
