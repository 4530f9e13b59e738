//! Binding between an exercise's declared type and the sets logged for it.
//!
//! A workout exercise holds three independent set collections (strength,
//! cardio, flexibility). At most one of them may be non-empty, and it must be
//! the one matching the exercise type.
//!
//! Two strengths of the rule are exposed:
//!
//! - [`check_pending`] allows an entry with no sets at all, so an exercise can
//!   be added to a session before anything is logged for it.
//! - [`check_complete`] additionally requires at least one matching set; it
//!   applies once the session is being completed.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::ExerciseType;

/// The three set shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetKind {
    Strength,
    Cardio,
    Flexibility,
}

impl SetKind {
    /// The only set kind an exercise of `exercise_type` accepts.
    pub fn for_exercise(exercise_type: ExerciseType) -> SetKind {
        match exercise_type {
            ExerciseType::Strength => SetKind::Strength,
            ExerciseType::Cardio => SetKind::Cardio,
            ExerciseType::Flexibility => SetKind::Flexibility,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SetKind::Strength => "strength",
            SetKind::Cardio => "cardio",
            SetKind::Flexibility => "flexibility",
        }
    }
}

impl std::fmt::Display for SetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active set counts per kind for one workout exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SetCounts {
    pub strength: i64,
    pub cardio: i64,
    pub flexibility: i64,
}

impl SetCounts {
    pub fn get(&self, kind: SetKind) -> i64 {
        match kind {
            SetKind::Strength => self.strength,
            SetKind::Cardio => self.cardio,
            SetKind::Flexibility => self.flexibility,
        }
    }

    /// Counts after one more set of `kind` is attached.
    pub fn with_added(mut self, kind: SetKind) -> Self {
        match kind {
            SetKind::Strength => self.strength += 1,
            SetKind::Cardio => self.cardio += 1,
            SetKind::Flexibility => self.flexibility += 1,
        }
        self
    }

    /// Kinds with at least one set, in declaration order.
    pub fn kinds_present(&self) -> Vec<SetKind> {
        [SetKind::Strength, SetKind::Cardio, SetKind::Flexibility]
            .into_iter()
            .filter(|k| self.get(*k) > 0)
            .collect()
    }

    pub fn total(&self) -> i64 {
        self.strength + self.cardio + self.flexibility
    }
}

/// Reject mixed kinds and kinds that differ from the exercise type.
/// An entry with no sets passes.
pub fn check_pending(exercise_type: ExerciseType, counts: SetCounts) -> Result<(), CoreError> {
    let expected = SetKind::for_exercise(exercise_type);
    let present = counts.kinds_present();

    if let Some(wrong) = present.iter().find(|k| **k != expected) {
        return Err(CoreError::Validation(format!(
            "A {exercise_type} exercise only accepts {expected} sets, but {wrong} sets were supplied"
        )));
    }
    Ok(())
}

/// [`check_pending`] plus: at least one set of the matching kind must exist.
pub fn check_complete(exercise_type: ExerciseType, counts: SetCounts) -> Result<(), CoreError> {
    check_pending(exercise_type, counts)?;
    let expected = SetKind::for_exercise(exercise_type);
    if counts.get(expected) == 0 {
        return Err(CoreError::Validation(format!(
            "A {exercise_type} exercise requires at least one {expected} set"
        )));
    }
    Ok(())
}
