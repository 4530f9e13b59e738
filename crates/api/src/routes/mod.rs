pub mod admin;
pub mod exercises;
pub mod health;
pub mod sets;
pub mod users;
pub mod workout_exercises;
pub mod workouts;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users                                      profile, registration, admin user management
/// /admin/users/{id}/purge                     compliance hard delete
/// /exercises                                  exercise library
/// /workouts                                   workout sessions, status, trash, entries
/// /workout-exercises/{id}                     session entries and their set collections
/// /strength-sets/{id}                         single strength set
/// /cardio-sets/{id}                           single cardio set
/// /flexibility-sets/{id}                      single flexibility set
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/admin", admin::router())
        .nest("/exercises", exercises::router())
        .nest("/workouts", workouts::router())
        .nest("/workout-exercises", workout_exercises::router())
        .merge(sets::router())
}
