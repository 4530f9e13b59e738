//! Set models: one row type per set kind, unified by [`ExerciseSet`].
//!
//! Each kind lives in its own table with only its own measurement columns,
//! so a cardio set simply has no `reps`. The DTO ranges mirror the CHECK
//! constraints in the migrations.

use repwise_core::set_consistency::SetKind;
use repwise_core::types::{DbId, Timestamp, Version};
use repwise_core::validation::validate_weight_precision;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::repositories::soft_delete_repo::SoftDeleteEntity;

const SET_SORTABLE: &[&str] = &["id", "set_number", "created_at"];

// ---------------------------------------------------------------------------
// Strength
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StrengthSet {
    pub id: DbId,
    pub workout_exercise_id: DbId,
    pub set_number: i32,
    pub reps: i32,
    pub weight: Option<f64>,
    pub rest_seconds: Option<i32>,
    pub completed: bool,
    pub notes: Option<String>,
    pub deleted: bool,
    pub deleted_at: Option<Timestamp>,
    pub version: Version,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SoftDeleteEntity for StrengthSet {
    const TABLE: &'static str = "strength_sets";
    const ENTITY: &'static str = "StrengthSet";
    const COLUMNS: &'static str = "id, workout_exercise_id, set_number, reps, weight, \
         rest_seconds, completed, notes, deleted, deleted_at, version, created_by, \
         updated_by, created_at, updated_at";
    const SORTABLE: &'static [&'static str] = SET_SORTABLE;
    const DEFAULT_ORDER: &'static str = "set_number ASC, id ASC";
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStrengthSet {
    #[validate(range(min = 1, max = 50, message = "Set number must be between 1 and 50"))]
    pub set_number: i32,
    #[validate(range(min = 1, max = 1000, message = "Reps must be between 1 and 1000"))]
    pub reps: i32,
    #[validate(
        range(min = 0.0, max = 999.99, message = "Weight must be between 0 and 999.99"),
        custom(function = "validate_weight_precision")
    )]
    pub weight: Option<f64>,
    #[validate(range(min = 0, max = 3600, message = "Rest time must be between 0 and 3600 seconds"))]
    pub rest_seconds: Option<i32>,
    #[serde(default)]
    pub completed: bool,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStrengthSet {
    #[validate(range(min = 1, max = 50, message = "Set number must be between 1 and 50"))]
    pub set_number: i32,
    #[validate(range(min = 1, max = 1000, message = "Reps must be between 1 and 1000"))]
    pub reps: i32,
    #[validate(
        range(min = 0.0, max = 999.99, message = "Weight must be between 0 and 999.99"),
        custom(function = "validate_weight_precision")
    )]
    pub weight: Option<f64>,
    #[validate(range(min = 0, max = 3600, message = "Rest time must be between 0 and 3600 seconds"))]
    pub rest_seconds: Option<i32>,
    #[serde(default)]
    pub completed: bool,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
    pub version: Version,
}

// ---------------------------------------------------------------------------
// Cardio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CardioSet {
    pub id: DbId,
    pub workout_exercise_id: DbId,
    pub set_number: i32,
    pub duration_seconds: i32,
    pub distance: Option<f64>,
    pub distance_unit: Option<String>,
    pub rest_seconds: Option<i32>,
    pub completed: bool,
    pub notes: Option<String>,
    pub deleted: bool,
    pub deleted_at: Option<Timestamp>,
    pub version: Version,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SoftDeleteEntity for CardioSet {
    const TABLE: &'static str = "cardio_sets";
    const ENTITY: &'static str = "CardioSet";
    const COLUMNS: &'static str = "id, workout_exercise_id, set_number, duration_seconds, \
         distance, distance_unit, rest_seconds, completed, notes, deleted, deleted_at, \
         version, created_by, updated_by, created_at, updated_at";
    const SORTABLE: &'static [&'static str] = SET_SORTABLE;
    const DEFAULT_ORDER: &'static str = "set_number ASC, id ASC";
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCardioSet {
    #[validate(range(min = 1, max = 50, message = "Set number must be between 1 and 50"))]
    pub set_number: i32,
    #[validate(range(min = 1, max = 14400, message = "Duration must be between 1 and 14400 seconds"))]
    pub duration_seconds: i32,
    #[validate(range(min = 0.0, max = 1000.0, message = "Distance must be between 0 and 1000"))]
    pub distance: Option<f64>,
    #[validate(length(max = 10, message = "Distance unit cannot exceed 10 characters"))]
    pub distance_unit: Option<String>,
    #[validate(range(min = 0, max = 3600, message = "Rest time must be between 0 and 3600 seconds"))]
    pub rest_seconds: Option<i32>,
    #[serde(default)]
    pub completed: bool,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCardioSet {
    #[validate(range(min = 1, max = 50, message = "Set number must be between 1 and 50"))]
    pub set_number: i32,
    #[validate(range(min = 1, max = 14400, message = "Duration must be between 1 and 14400 seconds"))]
    pub duration_seconds: i32,
    #[validate(range(min = 0.0, max = 1000.0, message = "Distance must be between 0 and 1000"))]
    pub distance: Option<f64>,
    #[validate(length(max = 10, message = "Distance unit cannot exceed 10 characters"))]
    pub distance_unit: Option<String>,
    #[validate(range(min = 0, max = 3600, message = "Rest time must be between 0 and 3600 seconds"))]
    pub rest_seconds: Option<i32>,
    #[serde(default)]
    pub completed: bool,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
    pub version: Version,
}

// ---------------------------------------------------------------------------
// Flexibility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FlexibilitySet {
    pub id: DbId,
    pub workout_exercise_id: DbId,
    pub set_number: i32,
    pub duration_seconds: i32,
    pub stretch_type: Option<String>,
    pub intensity: Option<i32>,
    pub rest_seconds: Option<i32>,
    pub completed: bool,
    pub notes: Option<String>,
    pub deleted: bool,
    pub deleted_at: Option<Timestamp>,
    pub version: Version,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SoftDeleteEntity for FlexibilitySet {
    const TABLE: &'static str = "flexibility_sets";
    const ENTITY: &'static str = "FlexibilitySet";
    const COLUMNS: &'static str = "id, workout_exercise_id, set_number, duration_seconds, \
         stretch_type, intensity, rest_seconds, completed, notes, deleted, deleted_at, \
         version, created_by, updated_by, created_at, updated_at";
    const SORTABLE: &'static [&'static str] = SET_SORTABLE;
    const DEFAULT_ORDER: &'static str = "set_number ASC, id ASC";
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFlexibilitySet {
    #[validate(range(min = 1, max = 50, message = "Set number must be between 1 and 50"))]
    pub set_number: i32,
    #[validate(range(min = 1, max = 3600, message = "Duration must be between 1 and 3600 seconds"))]
    pub duration_seconds: i32,
    #[validate(length(max = 50, message = "Stretch type cannot exceed 50 characters"))]
    pub stretch_type: Option<String>,
    #[validate(range(min = 1, max = 10, message = "Intensity must be between 1 and 10"))]
    pub intensity: Option<i32>,
    #[validate(range(min = 0, max = 3600, message = "Rest time must be between 0 and 3600 seconds"))]
    pub rest_seconds: Option<i32>,
    #[serde(default)]
    pub completed: bool,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateFlexibilitySet {
    #[validate(range(min = 1, max = 50, message = "Set number must be between 1 and 50"))]
    pub set_number: i32,
    #[validate(range(min = 1, max = 3600, message = "Duration must be between 1 and 3600 seconds"))]
    pub duration_seconds: i32,
    #[validate(length(max = 50, message = "Stretch type cannot exceed 50 characters"))]
    pub stretch_type: Option<String>,
    #[validate(range(min = 1, max = 10, message = "Intensity must be between 1 and 10"))]
    pub intensity: Option<i32>,
    #[validate(range(min = 0, max = 3600, message = "Rest time must be between 0 and 3600 seconds"))]
    pub rest_seconds: Option<i32>,
    #[serde(default)]
    pub completed: bool,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
    pub version: Version,
}

// ---------------------------------------------------------------------------
// Unified view
// ---------------------------------------------------------------------------

/// Any set, tagged with its kind on the wire (`"kind": "strength"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExerciseSet {
    Strength(StrengthSet),
    Cardio(CardioSet),
    Flexibility(FlexibilitySet),
}

impl ExerciseSet {
    pub fn kind(&self) -> SetKind {
        match self {
            ExerciseSet::Strength(_) => SetKind::Strength,
            ExerciseSet::Cardio(_) => SetKind::Cardio,
            ExerciseSet::Flexibility(_) => SetKind::Flexibility,
        }
    }

    pub fn set_number(&self) -> i32 {
        match self {
            ExerciseSet::Strength(s) => s.set_number,
            ExerciseSet::Cardio(s) => s.set_number,
            ExerciseSet::Flexibility(s) => s.set_number,
        }
    }
}

impl From<StrengthSet> for ExerciseSet {
    fn from(set: StrengthSet) -> Self {
        ExerciseSet::Strength(set)
    }
}

impl From<CardioSet> for ExerciseSet {
    fn from(set: CardioSet) -> Self {
        ExerciseSet::Cardio(set)
    }
}

impl From<FlexibilitySet> for ExerciseSet {
    fn from(set: FlexibilitySet) -> Self {
        ExerciseSet::Flexibility(set)
    }
}
