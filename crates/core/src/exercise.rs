//! Exercise library vocabulary and the built-in seed catalogue.

use std::borrow::Cow;

use validator::ValidationError;

use crate::status::ExerciseType;

pub const MUSCLE_GROUPS: &[&str] = &[
    "CHEST",
    "BACK",
    "SHOULDERS",
    "BICEPS",
    "TRICEPS",
    "LEGS",
    "GLUTES",
    "CORE",
    "FULL_BODY",
    "CARDIO",
];

pub const DIFFICULTY_LEVELS: &[&str] = &["BEGINNER", "INTERMEDIATE", "ADVANCED"];

pub fn validate_muscle_group(value: &str) -> Result<(), ValidationError> {
    one_of(value, MUSCLE_GROUPS, "muscle_group")
}

pub fn validate_difficulty(value: &str) -> Result<(), ValidationError> {
    one_of(value, DIFFICULTY_LEVELS, "difficulty")
}

fn one_of(value: &str, allowed: &[&str], code: &'static str) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Owned(format!("Must be one of: {}", allowed.join(", "))));
    Err(err)
}

/// One entry of the built-in exercise library.
#[derive(Debug, Clone, Copy)]
pub struct SeedExercise {
    pub name: &'static str,
    pub description: &'static str,
    pub exercise_type: ExerciseType,
    pub muscle_group: &'static str,
    pub difficulty: &'static str,
}

/// Inserted at startup when the exercise table is empty.
pub const SEED_EXERCISES: &[SeedExercise] = &[
    SeedExercise {
        name: "Bench Press",
        description: "Barbell press from the chest while lying on a flat bench.",
        exercise_type: ExerciseType::Strength,
        muscle_group: "CHEST",
        difficulty: "INTERMEDIATE",
    },
    SeedExercise {
        name: "Back Squat",
        description: "Barbell squat with the bar resting across the upper back.",
        exercise_type: ExerciseType::Strength,
        muscle_group: "LEGS",
        difficulty: "INTERMEDIATE",
    },
    SeedExercise {
        name: "Deadlift",
        description: "Lift a loaded barbell from the floor to hip height.",
        exercise_type: ExerciseType::Strength,
        muscle_group: "BACK",
        difficulty: "ADVANCED",
    },
    SeedExercise {
        name: "Overhead Press",
        description: "Press a barbell from the shoulders to full lockout overhead.",
        exercise_type: ExerciseType::Strength,
        muscle_group: "SHOULDERS",
        difficulty: "INTERMEDIATE",
    },
    SeedExercise {
        name: "Pull-Up",
        description: "Hang from a bar and pull the chin above it.",
        exercise_type: ExerciseType::Strength,
        muscle_group: "BACK",
        difficulty: "INTERMEDIATE",
    },
    SeedExercise {
        name: "Dumbbell Curl",
        description: "Curl dumbbells from full extension to the shoulders.",
        exercise_type: ExerciseType::Strength,
        muscle_group: "BICEPS",
        difficulty: "BEGINNER",
    },
    SeedExercise {
        name: "Plank",
        description: "Hold a straight-body position on forearms and toes.",
        exercise_type: ExerciseType::Strength,
        muscle_group: "CORE",
        difficulty: "BEGINNER",
    },
    SeedExercise {
        name: "Running",
        description: "Steady-state outdoor or treadmill running.",
        exercise_type: ExerciseType::Cardio,
        muscle_group: "CARDIO",
        difficulty: "BEGINNER",
    },
    SeedExercise {
        name: "Cycling",
        description: "Road, trail, or stationary bike riding.",
        exercise_type: ExerciseType::Cardio,
        muscle_group: "CARDIO",
        difficulty: "BEGINNER",
    },
    SeedExercise {
        name: "Rowing (Machine)",
        description: "Indoor rowing ergometer intervals or steady work.",
        exercise_type: ExerciseType::Cardio,
        muscle_group: "FULL_BODY",
        difficulty: "INTERMEDIATE",
    },
    SeedExercise {
        name: "Hamstring Stretch",
        description: "Seated or standing forward fold targeting the hamstrings.",
        exercise_type: ExerciseType::Flexibility,
        muscle_group: "LEGS",
        difficulty: "BEGINNER",
    },
    SeedExercise {
        name: "Hip Flexor Stretch",
        description: "Half-kneeling lunge stretch for the hip flexors.",
        exercise_type: ExerciseType::Flexibility,
        muscle_group: "GLUTES",
        difficulty: "BEGINNER",
    },
];
