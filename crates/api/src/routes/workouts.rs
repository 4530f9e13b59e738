//! Route definitions for the `/workouts` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::workout_sessions;
use crate::state::AppState;

/// Routes mounted at `/workouts`.
///
/// ```text
/// GET    /                 -> list           (?status=&includeDeleted=&page=&size=&sort=)
/// POST   /                 -> create
/// GET    /deleted          -> list_deleted
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// DELETE /{id}             -> delete         (cascading soft delete)
/// PATCH  /{id}/status      -> update_status
/// POST   /{id}/restore     -> restore        (cascading restore)
/// GET    /{id}/exercises   -> list_exercises
/// POST   /{id}/exercises   -> add_exercise
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(workout_sessions::list).post(workout_sessions::create),
        )
        .route("/deleted", get(workout_sessions::list_deleted))
        .route(
            "/{id}",
            get(workout_sessions::get_by_id)
                .put(workout_sessions::update)
                .delete(workout_sessions::delete),
        )
        .route("/{id}/status", patch(workout_sessions::update_status))
        .route("/{id}/restore", post(workout_sessions::restore))
        .route(
            "/{id}/exercises",
            get(workout_sessions::list_exercises).post(workout_sessions::add_exercise),
        )
}
