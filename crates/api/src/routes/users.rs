//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                           -> list            (admin, read:users)
/// POST   /                           -> register        (token only, per-IP limit)
/// GET    /me                         -> me
/// PUT    /me                         -> update_me
/// GET    /exists/username/{username} -> username_exists (public, per-IP limit)
/// GET    /exists/email/{email}       -> email_exists    (public, per-IP limit)
/// GET    /{id}                       -> get_by_id       (admin, read:users)
/// DELETE /{id}                       -> delete          (admin, delete:users)
/// POST   /{id}/restore               -> restore         (admin, delete:users)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::register))
        .route("/me", get(users::me).put(users::update_me))
        .route("/exists/username/{username}", get(users::username_exists))
        .route("/exists/email/{email}", get(users::email_exists))
        .route("/{id}", get(users::get_by_id).delete(users::delete))
        .route("/{id}/restore", post(users::restore))
}
