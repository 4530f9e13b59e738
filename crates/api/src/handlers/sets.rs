//! Handlers for the three set resources.
//!
//! Each kind is nested under its workout exercise for listing and creation
//! (`/workout-exercises/{id}/strength-sets`) and addressed directly for
//! everything else (`/strength-sets/{id}`). A set is only accepted when its
//! kind matches the exercise type and no other kind is already logged.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use repwise_core::error::CoreError;
use repwise_core::set_consistency::{check_pending, SetKind};
use repwise_core::types::DbId;
use repwise_core::validation::validate_input;
use repwise_db::models::exercise_set::{
    CardioSet, CreateCardioSet, CreateFlexibilitySet, CreateStrengthSet, FlexibilitySet,
    StrengthSet, UpdateCardioSet, UpdateFlexibilitySet, UpdateStrengthSet,
};
use repwise_db::models::workout_exercise::WorkoutExercise;
use repwise_db::repositories::{
    CardioSetRepo, ExerciseRepo, FlexibilitySetRepo, SoftDeleteRepo, StrengthSetRepo,
    WorkoutExerciseRepo,
};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::access;
use crate::middleware::rbac::{Authorized, DeleteWorkouts, ReadWorkouts, WriteWorkouts};
use crate::response::DataResponse;
use crate::state::AppState;

/// Reject a new set of `kind` on `workout_exercise_id` if it would mix kinds
/// or contradict the exercise type.
async fn check_set_kind(state: &AppState, workout_exercise_id: DbId, kind: SetKind) -> AppResult<()> {
    let entry = SoftDeleteRepo::<WorkoutExercise>::find_by_id(&state.pool, workout_exercise_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkoutExercise",
            id: workout_exercise_id,
        }))?;
    let exercise = ExerciseRepo::find_by_id(&state.pool, entry.exercise_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Exercise",
            id: entry.exercise_id,
        }))?;
    let counts = WorkoutExerciseRepo::set_counts(&state.pool, workout_exercise_id).await?;
    check_pending(exercise.exercise_type, counts.with_added(kind))?;
    Ok(())
}

macro_rules! set_handlers {
    (
        $module:ident,
        kind: $kind:expr,
        row: $row:ty,
        create: $create:ty,
        update: $update:ty,
        repo: $repo:ident $(,)?
    ) => {
        pub mod $module {
            use super::*;

            const KIND: SetKind = $kind;

            fn not_found(id: DbId) -> AppError {
                AppError::Core(CoreError::NotFound {
                    entity: access::set_entity(KIND),
                    id,
                })
            }

            /// GET /api/v1/workout-exercises/{id}/<kind>-sets
            pub async fn list(
                State(state): State<AppState>,
                Authorized(user, _): Authorized<ReadWorkouts>,
                AppPath(workout_exercise_id): AppPath<DbId>,
            ) -> AppResult<Json<DataResponse<Vec<$row>>>> {
                access::workout_exercise(&state, &user, workout_exercise_id).await?;
                let sets = $repo::list_by_workout_exercise(&state.pool, workout_exercise_id).await?;
                Ok(Json(DataResponse::new(sets)))
            }

            /// POST /api/v1/workout-exercises/{id}/<kind>-sets
            pub async fn create(
                State(state): State<AppState>,
                Authorized(user, _): Authorized<WriteWorkouts>,
                AppPath(workout_exercise_id): AppPath<DbId>,
                AppJson(input): AppJson<$create>,
            ) -> AppResult<(StatusCode, Json<DataResponse<$row>>)> {
                access::workout_exercise(&state, &user, workout_exercise_id).await?;
                validate_input(&input)?;
                check_set_kind(&state, workout_exercise_id, KIND).await?;

                let set = $repo::create(&state.pool, workout_exercise_id, &input, user.actor()).await?;
                tracing::info!(
                    kind = %KIND,
                    set_id = set.id,
                    workout_exercise_id,
                    set_number = set.set_number,
                    "Set logged"
                );
                Ok((StatusCode::CREATED, Json(DataResponse::new(set))))
            }

            /// GET /api/v1/<kind>-sets/{id}
            pub async fn get_by_id(
                State(state): State<AppState>,
                Authorized(user, _): Authorized<ReadWorkouts>,
                AppPath(id): AppPath<DbId>,
            ) -> AppResult<Json<DataResponse<$row>>> {
                access::set(&state, &user, KIND, id).await?;
                let set = SoftDeleteRepo::<$row>::find_by_id(&state.pool, id)
                    .await?
                    .ok_or_else(|| not_found(id))?;
                Ok(Json(DataResponse::new(set)))
            }

            /// PUT /api/v1/<kind>-sets/{id}
            pub async fn update(
                State(state): State<AppState>,
                Authorized(user, _): Authorized<WriteWorkouts>,
                AppPath(id): AppPath<DbId>,
                AppJson(input): AppJson<$update>,
            ) -> AppResult<Json<DataResponse<$row>>> {
                access::set(&state, &user, KIND, id).await?;
                validate_input(&input)?;

                let Some(set) = $repo::update(&state.pool, id, &input, user.actor()).await? else {
                    let miss =
                        SoftDeleteRepo::<$row>::write_miss(&state.pool, id, input.version).await?;
                    return Err(miss.into());
                };
                tracing::info!(kind = %KIND, set_id = id, version = set.version, "Set updated");
                Ok(Json(DataResponse::new(set)))
            }

            /// DELETE /api/v1/<kind>-sets/{id}
            pub async fn delete(
                State(state): State<AppState>,
                Authorized(user, _): Authorized<DeleteWorkouts>,
                AppPath(id): AppPath<DbId>,
            ) -> AppResult<StatusCode> {
                access::set(&state, &user, KIND, id).await?;
                let now = state.clock.now();
                if SoftDeleteRepo::<$row>::soft_delete(&state.pool, id, now, user.actor()).await? {
                    tracing::info!(kind = %KIND, set_id = id, "Set deleted");
                    Ok(StatusCode::NO_CONTENT)
                } else {
                    Err(not_found(id))
                }
            }
        }
    };
}

set_handlers!(
    strength,
    kind: SetKind::Strength,
    row: StrengthSet,
    create: CreateStrengthSet,
    update: UpdateStrengthSet,
    repo: StrengthSetRepo,
);

set_handlers!(
    cardio,
    kind: SetKind::Cardio,
    row: CardioSet,
    create: CreateCardioSet,
    update: UpdateCardioSet,
    repo: CardioSetRepo,
);

set_handlers!(
    flexibility,
    kind: SetKind::Flexibility,
    row: FlexibilitySet,
    create: CreateFlexibilitySet,
    update: UpdateFlexibilitySet,
    repo: FlexibilitySetRepo,
);
