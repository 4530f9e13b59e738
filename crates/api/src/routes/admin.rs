use axum::routing::delete;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// DELETE /users/{id}/purge -> purge_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/users/{id}/purge", delete(admin::purge_user))
}
