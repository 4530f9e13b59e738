//! Handlers for the `/exercises` resource (the shared exercise library).
//!
//! Reads need `read:exercises`; writes are admin-only. Exercises are not
//! soft-deletable: delete is physical and refused while any workout
//! references the exercise.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use repwise_core::error::CoreError;
use repwise_core::pagination::Page;
use repwise_core::types::DbId;
use repwise_core::validation::validate_input;
use repwise_db::models::exercise::{CreateExercise, Exercise, UpdateExercise};
use repwise_db::repositories::{exercise_repo, ExerciseRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::{
    Authorized, DeleteExercises, ReadExercises, RequireAdmin, WriteExercises,
};
use crate::query::{ExerciseListParams, Paged};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Exercise",
        id,
    })
}

/// GET /api/v1/exercises
pub async fn list(
    State(state): State<AppState>,
    _user: Authorized<ReadExercises>,
    AppQuery(params): AppQuery<ExerciseListParams>,
) -> AppResult<Json<DataResponse<Page<Exercise>>>> {
    let filter = params.filter()?;
    let sort = params.sort(exercise_repo::SORTABLE)?;
    let page =
        ExerciseRepo::search(&state.pool, &filter, params.page_request(), sort.as_ref()).await?;
    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/exercises/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: Authorized<ReadExercises>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Exercise>>> {
    let exercise = ExerciseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(exercise)))
}

/// POST /api/v1/exercises
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin, _): RequireAdmin<WriteExercises>,
    AppJson(input): AppJson<CreateExercise>,
) -> AppResult<(StatusCode, Json<DataResponse<Exercise>>)> {
    validate_input(&input)?;
    let exercise = ExerciseRepo::create(&state.pool, &input, admin.actor()).await?;
    tracing::info!(exercise_id = exercise.id, name = %exercise.name, "Exercise created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(exercise))))
}

/// PUT /api/v1/exercises/{id}
///
/// The exercise type is frozen once any workout references the exercise,
/// since existing sets were logged against it.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin, _): RequireAdmin<WriteExercises>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateExercise>,
) -> AppResult<Json<DataResponse<Exercise>>> {
    validate_input(&input)?;

    let existing = ExerciseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if existing.exercise_type != input.exercise_type
        && ExerciseRepo::is_referenced(&state.pool, id).await?
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Exercise type cannot change while workouts reference this exercise".into(),
        )));
    }

    let Some(exercise) = ExerciseRepo::update(&state.pool, id, &input, admin.actor()).await?
    else {
        return Err(match ExerciseRepo::current_version(&state.pool, id).await? {
            None => not_found(id),
            Some(current_version) => AppError::Core(CoreError::OptimisticLock {
                entity: "Exercise",
                id,
                expected_version: input.version,
                current_version,
            }),
        });
    };

    tracing::info!(exercise_id = id, "Exercise updated");
    Ok(Json(DataResponse::new(exercise)))
}

/// DELETE /api/v1/exercises/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin, _): RequireAdmin<DeleteExercises>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if ExerciseRepo::is_referenced(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Exercise is used by existing workouts and cannot be deleted".into(),
        )));
    }
    if ExerciseRepo::delete(&state.pool, id).await? {
        tracing::info!(exercise_id = id, admin_id = admin.user_id(), "Exercise deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
