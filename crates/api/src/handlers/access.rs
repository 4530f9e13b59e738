//! Ownership gate shared by the workout, workout-exercise, and set handlers.
//!
//! Runs after scope checks and before body validation: a resource that is
//! missing or soft-deleted anywhere along its chain is 404, one owned by
//! another user is 403 (admins pass).

use repwise_core::error::CoreError;
use repwise_core::ownership::authorize_access;
use repwise_core::set_consistency::SetKind;
use repwise_core::types::DbId;
use repwise_db::repositories::OwnershipRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub async fn session(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<()> {
    let owner = OwnershipRepo::session_owner(&state.pool, id).await?;
    gate(user, "WorkoutSession", id, owner)
}

pub async fn workout_exercise(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<()> {
    let owner = OwnershipRepo::workout_exercise_owner(&state.pool, id).await?;
    gate(user, "WorkoutExercise", id, owner)
}

pub async fn set(state: &AppState, user: &AuthUser, kind: SetKind, id: DbId) -> AppResult<()> {
    let owner = OwnershipRepo::set_owner(&state.pool, kind, id).await?;
    gate(user, set_entity(kind), id, owner)
}

pub fn set_entity(kind: SetKind) -> &'static str {
    match kind {
        SetKind::Strength => "StrengthSet",
        SetKind::Cardio => "CardioSet",
        SetKind::Flexibility => "FlexibilitySet",
    }
}

pub(crate) fn gate(
    user: &AuthUser,
    entity: &'static str,
    id: DbId,
    owner: Option<DbId>,
) -> AppResult<()> {
    authorize_access(&user.principal, entity, id, owner).map_err(|e| {
        if matches!(e, CoreError::Forbidden(_)) {
            tracing::warn!(user_id = user.user_id(), entity, id, "Access to another user's resource denied");
        }
        e.into()
    })
}
