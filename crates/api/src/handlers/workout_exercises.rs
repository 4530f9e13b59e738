//! Handlers for the `/workout-exercises` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use repwise_core::error::CoreError;
use repwise_core::types::DbId;
use repwise_core::validation::validate_input;
use repwise_db::models::workout_exercise::{
    UpdateWorkoutExercise, WorkoutExercise, WorkoutExerciseDetail,
};
use repwise_db::repositories::{SoftDeleteRepo, WorkoutExerciseRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::access;
use crate::middleware::rbac::{Authorized, DeleteWorkouts, ReadWorkouts, WriteWorkouts};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "WorkoutExercise",
        id,
    })
}

/// GET /api/v1/workout-exercises/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<ReadWorkouts>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<WorkoutExerciseDetail>>> {
    access::workout_exercise(&state, &user, id).await?;
    let entry = SoftDeleteRepo::<WorkoutExercise>::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let detail = WorkoutExerciseRepo::with_details(&state.pool, vec![entry])
        .await?
        .pop()
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(detail)))
}

/// PUT /api/v1/workout-exercises/{id}
pub async fn update(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<WriteWorkouts>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateWorkoutExercise>,
) -> AppResult<Json<DataResponse<WorkoutExercise>>> {
    access::workout_exercise(&state, &user, id).await?;
    validate_input(&input)?;

    let Some(entry) = WorkoutExerciseRepo::update(&state.pool, id, &input, user.actor()).await?
    else {
        let miss =
            SoftDeleteRepo::<WorkoutExercise>::write_miss(&state.pool, id, input.version).await?;
        return Err(miss.into());
    };

    tracing::info!(workout_exercise_id = id, order_index = entry.order_index, "Workout exercise updated");
    Ok(Json(DataResponse::new(entry)))
}

/// DELETE /api/v1/workout-exercises/{id}
///
/// Soft-deletes the entry and its sets.
pub async fn delete(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<DeleteWorkouts>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    access::workout_exercise(&state, &user, id).await?;
    let now = state.clock.now();
    if WorkoutExerciseRepo::soft_delete_cascade(&state.pool, id, now, user.actor()).await? {
        tracing::info!(workout_exercise_id = id, "Workout exercise deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
