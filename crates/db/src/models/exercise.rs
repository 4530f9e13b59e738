//! Exercise library model and DTOs.

use repwise_core::exercise::{validate_difficulty, validate_muscle_group};
use repwise_core::status::ExerciseType;
use repwise_core::types::{DbId, Timestamp, Version};
use repwise_core::validation::{validate_not_blank, EXERCISE_NAME_RE};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// An exercise row from the `exercises` table. Exercises are shared by
/// every user and have no owner.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Exercise {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(rename = "exercise_type_id", try_from = "i16")]
    pub exercise_type: ExerciseType,
    pub muscle_group: String,
    pub difficulty: String,
    pub image_url: Option<String>,
    pub version: Version,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an exercise.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExercise {
    #[validate(
        length(min = 2, max = 100, message = "Exercise name must be between 2 and 100 characters"),
        regex(path = *EXERCISE_NAME_RE, message = "Exercise name contains invalid characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,
    pub exercise_type: ExerciseType,
    #[validate(custom(function = "validate_muscle_group"))]
    pub muscle_group: String,
    #[validate(custom(function = "validate_difficulty"))]
    pub difficulty: String,
    #[validate(
        length(max = 500, message = "Image URL cannot exceed 500 characters"),
        url(message = "Image URL must be a valid URL")
    )]
    pub image_url: Option<String>,
}

/// DTO for replacing an exercise. `version` must match the stored row.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateExercise {
    #[validate(
        length(min = 2, max = 100, message = "Exercise name must be between 2 and 100 characters"),
        regex(path = *EXERCISE_NAME_RE, message = "Exercise name contains invalid characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,
    pub exercise_type: ExerciseType,
    #[validate(custom(function = "validate_muscle_group"))]
    pub muscle_group: String,
    #[validate(custom(function = "validate_difficulty"))]
    pub difficulty: String,
    #[validate(
        length(max = 500, message = "Image URL cannot exceed 500 characters"),
        url(message = "Image URL must be a valid URL")
    )]
    pub image_url: Option<String>,
    pub version: Version,
}

/// Filters accepted by the exercise search.
#[derive(Debug, Clone, Default)]
pub struct ExerciseFilter {
    pub exercise_type: Option<ExerciseType>,
    pub muscle_group: Option<String>,
    pub difficulty: Option<String>,
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use repwise_core::error::CoreError;
    use repwise_core::validation::validate_input;

    fn valid() -> CreateExercise {
        CreateExercise {
            name: "Incline Press (Dumbbell)".to_string(),
            description: None,
            exercise_type: ExerciseType::Strength,
            muscle_group: "CHEST".to_string(),
            difficulty: "BEGINNER".to_string(),
            image_url: Some("https://cdn.example.com/incline.png".to_string()),
        }
    }

    #[test]
    fn valid_exercise_passes() {
        assert!(validate_input(&valid()).is_ok());
    }

    #[test]
    fn every_bad_field_is_reported() {
        let input = CreateExercise {
            name: "X!".to_string(),
            muscle_group: "NECK".to_string(),
            image_url: Some("not a url".to_string()),
            ..valid()
        };
        assert_matches!(validate_input(&input), Err(CoreError::FieldValidation(fields)) => {
            assert!(fields.contains_key("name"));
            assert!(fields.contains_key("muscle_group"));
            assert!(fields.contains_key("image_url"));
            assert!(!fields.contains_key("difficulty"));
        });
    }

    #[test]
    fn exercise_type_deserializes_from_label() {
        let json = r#"{"name":"Rowing","exercise_type":"CARDIO","muscle_group":"BACK","difficulty":"BEGINNER"}"#;
        let input: CreateExercise = serde_json::from_str(json).unwrap();
        assert_eq!(input.exercise_type, ExerciseType::Cardio);
    }
}
