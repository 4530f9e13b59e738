//! Admin-only compliance operations.

use axum::extract::State;
use axum::http::StatusCode;
use repwise_core::error::CoreError;
use repwise_core::types::DbId;
use repwise_db::models::user::User;
use repwise_db::repositories::SoftDeleteRepo;

use crate::error::{AppError, AppResult};
use crate::extract::AppPath;
use crate::middleware::rbac::{DeleteUsers, RequireAdmin};
use crate::state::AppState;

/// DELETE /api/v1/admin/users/{id}/purge
///
/// Irreversibly remove a user, deleted or not. Their sessions, workout
/// exercises, and sets go with them through `ON DELETE CASCADE`.
pub async fn purge_user(
    State(state): State<AppState>,
    RequireAdmin(admin, _): RequireAdmin<DeleteUsers>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id() {
        return Err(AppError::Core(CoreError::Validation(
            "Administrators cannot purge their own account".into(),
        )));
    }
    if SoftDeleteRepo::<User>::hard_delete(&state.pool, id).await? {
        tracing::warn!(user_id = id, admin_id = admin.user_id(), "User permanently purged");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}
