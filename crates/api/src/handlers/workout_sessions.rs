//! Handlers for the `/workouts` resource.
//!
//! Every route is scoped to the caller's own sessions; admins may open any
//! session by id and may list their own including deleted ones.

use std::collections::HashSet;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use repwise_core::error::CoreError;
use repwise_core::pagination::Page;
use repwise_core::session_dates::check_session_dates;
use repwise_core::set_consistency::check_complete;
use repwise_core::types::DbId;
use repwise_core::validation::validate_input;
use repwise_core::workout_status::{apply_transition, WorkoutAction};
use repwise_db::models::workout_exercise::{
    AddWorkoutExercise, WorkoutExercise, WorkoutExerciseDetail,
};
use repwise_db::models::workout_session::{
    CreateWorkoutSession, UpdateWorkoutSession, UpdateWorkoutStatus, WorkoutSession,
    WorkoutSessionDetail,
};
use repwise_db::repositories::{
    ExerciseRepo, SoftDeleteEntity, SoftDeleteRepo, WorkoutExerciseRepo, WorkoutSessionRepo,
};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::access;
use crate::middleware::rbac::{Authorized, DeleteWorkouts, ReadWorkouts, WriteWorkouts};
use crate::query::{PageParams, Paged, WorkoutListParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "WorkoutSession",
        id,
    })
}

/// 404 for the first id in `ids` that is not in the exercise library.
async fn ensure_exercises_exist(state: &AppState, ids: &[DbId]) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: HashSet<DbId> = ExerciseRepo::find_by_ids(&state.pool, ids)
        .await?
        .into_iter()
        .map(|e| e.id)
        .collect();
    match ids.iter().find(|id| !found.contains(id)) {
        Some(&id) => Err(AppError::Core(CoreError::NotFound {
            entity: "Exercise",
            id,
        })),
        None => Ok(()),
    }
}

async fn load_detail(state: &AppState, id: DbId) -> AppResult<WorkoutSessionDetail> {
    WorkoutSessionRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// GET /api/v1/workouts
///
/// `?status=` filters by status label; `?includeDeleted=true` is admin only.
pub async fn list(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<ReadWorkouts>,
    AppQuery(params): AppQuery<WorkoutListParams>,
) -> AppResult<Json<DataResponse<Page<WorkoutSession>>>> {
    let status = params.status()?;
    let sort = params.sort(WorkoutSession::SORTABLE)?;
    let request = params.page_request();

    let page = if params.include_deleted {
        if !user.principal.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Only administrators may include deleted workouts".into(),
            )));
        }
        WorkoutSessionRepo::list_page_for_user_including_deleted(
            &state.pool,
            user.user_id(),
            status,
            request,
            sort.as_ref(),
        )
        .await?
    } else {
        WorkoutSessionRepo::list_page_for_user(
            &state.pool,
            user.user_id(),
            status,
            request,
            sort.as_ref(),
        )
        .await?
    };
    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/workouts/deleted
pub async fn list_deleted(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<ReadWorkouts>,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<Json<DataResponse<Page<WorkoutSession>>>> {
    let page =
        WorkoutSessionRepo::list_deleted_for_user(&state.pool, user.user_id(), params.page_request())
            .await?;
    Ok(Json(DataResponse::new(page)))
}

/// POST /api/v1/workouts
///
/// Creates the session and any initial exercises in one transaction.
pub async fn create(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<WriteWorkouts>,
    AppJson(input): AppJson<CreateWorkoutSession>,
) -> AppResult<(StatusCode, Json<DataResponse<WorkoutSessionDetail>>)> {
    validate_input(&input)?;
    check_session_dates(input.started_at, input.completed_at, state.clock.as_ref())?;

    let exercise_ids: Vec<DbId> = input.exercises.iter().map(|e| e.exercise_id).collect();
    ensure_exercises_exist(&state, &exercise_ids).await?;

    let session = WorkoutSessionRepo::create_with_exercises(
        &state.pool,
        user.user_id(),
        &input,
        user.actor(),
    )
    .await?;

    tracing::info!(
        session_id = session.id,
        user_id = user.user_id(),
        exercises = exercise_ids.len(),
        "Workout session created"
    );
    let detail = load_detail(&state, session.id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(detail))))
}

/// GET /api/v1/workouts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<ReadWorkouts>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<WorkoutSessionDetail>>> {
    access::session(&state, &user, id).await?;
    Ok(Json(DataResponse::new(load_detail(&state, id).await?)))
}

/// PUT /api/v1/workouts/{id}
pub async fn update(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<WriteWorkouts>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateWorkoutSession>,
) -> AppResult<Json<DataResponse<WorkoutSession>>> {
    access::session(&state, &user, id).await?;
    validate_input(&input)?;
    check_session_dates(input.started_at, input.completed_at, state.clock.as_ref())?;

    let Some(session) = WorkoutSessionRepo::update(&state.pool, id, &input, user.actor()).await?
    else {
        let miss = SoftDeleteRepo::<WorkoutSession>::write_miss(&state.pool, id, input.version).await?;
        return Err(miss.into());
    };

    tracing::info!(session_id = id, version = session.version, "Workout session updated");
    Ok(Json(DataResponse::new(session)))
}

/// PATCH /api/v1/workouts/{id}/status
///
/// Body: `{ "action": "start" | "pause" | "resume" | "complete" | "cancel", "version": n }`.
/// Completing requires every exercise in the session to hold at least one
/// set of its own kind.
pub async fn update_status(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<WriteWorkouts>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateWorkoutStatus>,
) -> AppResult<Json<DataResponse<WorkoutSession>>> {
    access::session(&state, &user, id).await?;

    let detail = load_detail(&state, id).await?;
    let session = &detail.session;
    if session.version != input.version {
        return Err(AppError::Core(CoreError::OptimisticLock {
            entity: "WorkoutSession",
            id,
            expected_version: input.version,
            current_version: session.version,
        }));
    }

    let (status, times) =
        apply_transition(session.status, input.action, session.times(), state.clock.now())?;
    // A start stamped after a recorded completion would break the date rule.
    check_session_dates(times.started_at, times.completed_at, state.clock.as_ref())?;

    if input.action == WorkoutAction::Complete {
        for entry in &detail.exercises {
            check_complete(entry.exercise.exercise_type, entry.set_counts()).map_err(|e| {
                match e {
                    CoreError::Validation(msg) => CoreError::Validation(format!(
                        "Cannot complete workout: {} ({msg})",
                        entry.exercise.name
                    )),
                    other => other,
                }
            })?;
        }
    }

    let Some(updated) = WorkoutSessionRepo::update_status(
        &state.pool,
        id,
        input.version,
        status,
        times,
        user.actor(),
    )
    .await?
    else {
        let miss = SoftDeleteRepo::<WorkoutSession>::write_miss(&state.pool, id, input.version).await?;
        return Err(miss.into());
    };

    tracing::info!(
        session_id = id,
        action = %input.action,
        from = %session.status,
        to = %updated.status,
        "Workout status changed"
    );
    Ok(Json(DataResponse::new(updated)))
}

/// DELETE /api/v1/workouts/{id}
///
/// Soft-deletes the session together with its exercises and sets.
pub async fn delete(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<DeleteWorkouts>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    access::session(&state, &user, id).await?;
    let now = state.clock.now();
    if WorkoutSessionRepo::soft_delete_cascade(&state.pool, id, now, user.actor()).await? {
        tracing::info!(session_id = id, user_id = user.user_id(), "Workout session deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/workouts/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<DeleteWorkouts>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<WorkoutSessionDetail>>> {
    // The ownership walk only sees active rows, so resolve the trashed row here.
    let owner = SoftDeleteRepo::<WorkoutSession>::find_by_id_including_deleted(&state.pool, id)
        .await?
        .filter(|s| s.deleted)
        .map(|s| s.user_id);
    access::gate(&user, "WorkoutSession", id, owner)?;

    if !WorkoutSessionRepo::restore_cascade(&state.pool, id, user.actor()).await? {
        return Err(not_found(id));
    }

    tracing::info!(session_id = id, user_id = user.user_id(), "Workout session restored");
    Ok(Json(DataResponse::new(load_detail(&state, id).await?)))
}

/// GET /api/v1/workouts/{id}/exercises
pub async fn list_exercises(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<ReadWorkouts>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Vec<WorkoutExerciseDetail>>>> {
    access::session(&state, &user, id).await?;
    let entries = WorkoutExerciseRepo::list_by_session(&state.pool, id).await?;
    let details = WorkoutExerciseRepo::with_details(&state.pool, entries).await?;
    Ok(Json(DataResponse::new(details)))
}

/// POST /api/v1/workouts/{id}/exercises
pub async fn add_exercise(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<WriteWorkouts>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<AddWorkoutExercise>,
) -> AppResult<(StatusCode, Json<DataResponse<WorkoutExercise>>)> {
    access::session(&state, &user, id).await?;
    validate_input(&input)?;
    ensure_exercises_exist(&state, &[input.exercise_id]).await?;

    let entry = WorkoutExerciseRepo::create(&state.pool, id, &input, user.actor()).await?;
    tracing::info!(
        session_id = id,
        workout_exercise_id = entry.id,
        exercise_id = entry.exercise_id,
        "Exercise added to workout"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(entry))))
}
