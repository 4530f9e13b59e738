//! Route definitions for the `/exercises` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::exercises;
use crate::state::AppState;

/// Routes mounted at `/exercises`.
///
/// ```text
/// GET    /      -> list       (?type=&muscleGroup=&difficulty=&name=&page=&size=&sort=)
/// POST   /      -> create     (admin)
/// GET    /{id}  -> get_by_id
/// PUT    /{id}  -> update     (admin)
/// DELETE /{id}  -> delete     (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(exercises::list).post(exercises::create))
        .route(
            "/{id}",
            get(exercises::get_by_id)
                .put(exercises::update)
                .delete(exercises::delete),
        )
}
