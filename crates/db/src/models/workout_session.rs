//! Workout session model and DTOs.

use chrono::NaiveDate;
use repwise_core::status::WorkoutStatus;
use repwise_core::types::{DbId, Timestamp, Version};
use repwise_core::validation::validate_not_blank;
use repwise_core::workout_status::{SessionTimes, WorkoutAction};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::workout_exercise::{AddWorkoutExercise, WorkoutExerciseDetail};
use crate::repositories::soft_delete_repo::SoftDeleteEntity;

/// A row from the `workout_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkoutSession {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(rename = "status_id", try_from = "i16")]
    pub status: WorkoutStatus,
    pub scheduled_date: Option<NaiveDate>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub deleted: bool,
    pub deleted_at: Option<Timestamp>,
    pub version: Version,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WorkoutSession {
    pub fn times(&self) -> SessionTimes {
        SessionTimes {
            started_at: self.started_at,
            completed_at: self.completed_at,
            duration_minutes: self.duration_minutes,
        }
    }
}

impl SoftDeleteEntity for WorkoutSession {
    const TABLE: &'static str = "workout_sessions";
    const ENTITY: &'static str = "WorkoutSession";
    const COLUMNS: &'static str = "id, user_id, name, description, status_id, scheduled_date, \
         started_at, completed_at, duration_minutes, notes, deleted, deleted_at, version, \
         created_by, updated_by, created_at, updated_at";
    const SORTABLE: &'static [&'static str] = &[
        "id",
        "name",
        "status_id",
        "scheduled_date",
        "started_at",
        "completed_at",
        "created_at",
        "updated_at",
    ];
    const DEFAULT_ORDER: &'static str = "created_at DESC, id DESC";
}

/// Body of `POST /workouts`.
///
/// New sessions always start out `PLANNED`; `started_at` / `completed_at`
/// may still be supplied to log a workout after the fact.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkoutSession {
    #[validate(
        length(min = 1, max = 100, message = "Workout name must be between 1 and 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    #[validate(range(min = 0, max = 1440, message = "Duration must be between 0 and 1440 minutes"))]
    pub duration_minutes: Option<i32>,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
    /// Exercises inserted in the same transaction as the session.
    #[serde(default)]
    #[validate(nested)]
    pub exercises: Vec<AddWorkoutExercise>,
}

/// Body of `PUT /workouts/{id}`: full replacement of the editable fields.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWorkoutSession {
    #[validate(
        length(min = 1, max = 100, message = "Workout name must be between 1 and 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    #[validate(range(min = 0, max = 1440, message = "Duration must be between 0 and 1440 minutes"))]
    pub duration_minutes: Option<i32>,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
    pub version: Version,
}

/// Body of `PATCH /workouts/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWorkoutStatus {
    pub action: WorkoutAction,
    pub version: Version,
}

/// A session together with its exercises and their sets.
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutSessionDetail {
    #[serde(flatten)]
    pub session: WorkoutSession,
    pub exercises: Vec<WorkoutExerciseDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use repwise_core::error::CoreError;
    use repwise_core::validation::validate_input;

    #[test]
    fn nested_exercise_errors_are_indexed() {
        let json = r#"{
            "name": "Leg day",
            "duration_minutes": 2000,
            "exercises": [
                {"exercise_id": 1},
                {"exercise_id": 2, "order_index": -1}
            ]
        }"#;
        let input: CreateWorkoutSession = serde_json::from_str(json).unwrap();
        assert_matches!(validate_input(&input), Err(CoreError::FieldValidation(fields)) => {
            assert!(fields.contains_key("duration_minutes"));
            assert!(fields.contains_key("exercises[1].order_index"));
            assert_eq!(fields.len(), 2);
        });
    }

    #[test]
    fn blank_name_is_rejected() {
        let input: CreateWorkoutSession = serde_json::from_str(r#"{"name": "   "}"#).unwrap();
        assert!(validate_input(&input).is_err());
        assert!(input.exercises.is_empty());
    }

    #[test]
    fn status_patch_parses_action() {
        let patch: UpdateWorkoutStatus =
            serde_json::from_str(r#"{"action": "start", "version": 0}"#).unwrap();
        assert_eq!(patch.action, WorkoutAction::Start);
        assert!(serde_json::from_str::<UpdateWorkoutStatus>(r#"{"action": "rewind", "version": 0}"#).is_err());
    }
}
