//! Workout exercise model and DTOs.
//!
//! A workout exercise is one entry of a session's plan: it points at a
//! library [`Exercise`] and owns the sets logged for it.

use repwise_core::set_consistency::SetCounts;
use repwise_core::types::{DbId, Timestamp, Version};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::exercise::Exercise;
use crate::models::exercise_set::ExerciseSet;
use crate::repositories::soft_delete_repo::SoftDeleteEntity;

/// A row from the `workout_exercises` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkoutExercise {
    pub id: DbId,
    pub workout_session_id: DbId,
    pub exercise_id: DbId,
    pub order_index: i32,
    pub notes: Option<String>,
    pub deleted: bool,
    pub deleted_at: Option<Timestamp>,
    pub version: Version,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SoftDeleteEntity for WorkoutExercise {
    const TABLE: &'static str = "workout_exercises";
    const ENTITY: &'static str = "WorkoutExercise";
    const COLUMNS: &'static str = "id, workout_session_id, exercise_id, order_index, notes, \
         deleted, deleted_at, version, created_by, updated_by, created_at, updated_at";
    const SORTABLE: &'static [&'static str] = &["id", "order_index", "created_at"];
    const DEFAULT_ORDER: &'static str = "order_index ASC, id ASC";
}

/// Body of `POST /workouts/{id}/exercises`, also used for the initial
/// exercises of a new session.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddWorkoutExercise {
    pub exercise_id: DbId,
    /// Appended after the last entry when omitted.
    #[validate(range(min = 0, max = 1000, message = "Order index must be between 0 and 1000"))]
    pub order_index: Option<i32>,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
}

/// Body of `PUT /workout-exercises/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWorkoutExercise {
    #[validate(range(min = 0, max = 1000, message = "Order index must be between 0 and 1000"))]
    pub order_index: i32,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
    pub version: Version,
}

/// A workout exercise with its library exercise and active sets.
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutExerciseDetail {
    #[serde(flatten)]
    pub workout_exercise: WorkoutExercise,
    pub exercise: Exercise,
    pub sets: Vec<ExerciseSet>,
}

impl WorkoutExerciseDetail {
    pub fn set_counts(&self) -> SetCounts {
        self.sets
            .iter()
            .fold(SetCounts::default(), |counts, set| counts.with_added(set.kind()))
    }
}
