use axum::routing::get;
use axum::Router;

use crate::handlers::sets::{cardio, flexibility, strength};
use crate::state::AppState;

/// Routes for individual sets, mounted at the API root.
///
/// ```text
/// GET|PUT|DELETE /strength-sets/{id}
/// GET|PUT|DELETE /cardio-sets/{id}
/// GET|PUT|DELETE /flexibility-sets/{id}
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/strength-sets/{id}",
            get(strength::get_by_id)
                .put(strength::update)
                .delete(strength::delete),
        )
        .route(
            "/cardio-sets/{id}",
            get(cardio::get_by_id)
                .put(cardio::update)
                .delete(cardio::delete),
        )
        .route(
            "/flexibility-sets/{id}",
            get(flexibility::get_by_id)
                .put(flexibility::update)
                .delete(flexibility::delete),
        )
}
