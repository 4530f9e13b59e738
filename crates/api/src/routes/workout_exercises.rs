//! Route definitions for the `/workout-exercises` resource and its nested
//! set collections.

use axum::routing::get;
use axum::Router;

use crate::handlers::sets::{cardio, flexibility, strength};
use crate::handlers::workout_exercises;
use crate::state::AppState;

/// Routes mounted at `/workout-exercises`.
///
/// ```text
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> delete             (cascades to sets)
/// GET    /{id}/strength-sets      -> strength::list
/// POST   /{id}/strength-sets      -> strength::create
/// GET    /{id}/cardio-sets        -> cardio::list
/// POST   /{id}/cardio-sets        -> cardio::create
/// GET    /{id}/flexibility-sets   -> flexibility::list
/// POST   /{id}/flexibility-sets   -> flexibility::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(workout_exercises::get_by_id)
                .put(workout_exercises::update)
                .delete(workout_exercises::delete),
        )
        .route(
            "/{id}/strength-sets",
            get(strength::list).post(strength::create),
        )
        .route("/{id}/cardio-sets", get(cardio::list).post(cardio::create))
        .route(
            "/{id}/flexibility-sets",
            get(flexibility::list).post(flexibility::create),
        )
}
