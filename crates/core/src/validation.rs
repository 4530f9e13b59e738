//! Request validation helpers.
//!
//! Request DTOs derive [`validator::Validate`] with their field constraints;
//! [`validate_input`] runs the whole pass and flattens every violation into a
//! single field -> message map so a client can fix everything in one round
//! trip. Cross-field business rules (set consistency, session dates) live in
//! their own modules because they need the assembled object graph.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::{CoreError, FieldErrors};

/// Exercise names: letters, digits, whitespace, hyphens, parentheses.
pub static EXERCISE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s\-()]+$").expect("exercise name regex is valid"));

/// Usernames: letters, digits, underscores.
pub static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("username regex is valid"));

// Domain ranges.
pub const SET_NUMBER_MIN: i32 = 1;
pub const SET_NUMBER_MAX: i32 = 50;
pub const REPS_MIN: i32 = 1;
pub const REPS_MAX: i32 = 1000;
pub const WEIGHT_MAX: f64 = 999.99;
pub const CARDIO_DURATION_MAX_SECS: i32 = 14_400;
pub const DISTANCE_MAX: f64 = 1000.0;
pub const REST_MAX_SECS: i32 = 3600;
pub const NOTES_MAX: u64 = 500;

/// Run every declared constraint on `input`, collecting all violations.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    match input.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(CoreError::FieldValidation(flatten_errors(&errors))),
    }
}

/// Flatten nested validator output into `field -> message`.
///
/// Nested structs are addressed as `parent.child`, list elements as
/// `parent[index].child`. When one field has several violations the first
/// message is kept.
pub fn flatten_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    collect(errors, "", &mut out);
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(first) = list.first() {
                    out.entry(path).or_insert_with(|| message_for(first));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn message_for(error: &ValidationError) -> String {
    match &error.message {
        Some(msg) => msg.to_string(),
        None => format!("Invalid value ({})", error.code),
    }
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Weights carry at most three integer digits and two decimal places.
pub fn validate_weight_precision(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(rule_error("weight_precision", "Weight must be a number"));
    }
    let scaled = value * 100.0;
    if (scaled - scaled.round()).abs() > 1e-6 {
        return Err(rule_error(
            "weight_precision",
            "Weight can have at most 2 decimal places",
        ));
    }
    Ok(())
}

/// Reject strings that are empty once trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule_error("not_blank", "Value must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use validator::Validate;

    #[derive(Validate)]
    struct Line {
        #[validate(range(min = 1, max = 50, message = "Set number must be between 1 and 50"))]
        set_number: i32,
        #[validate(length(max = 5, message = "Notes too long"))]
        notes: Option<String>,
    }

    #[derive(Validate)]
    struct Batch {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(nested)]
        lines: Vec<Line>,
    }

    #[test]
    fn collects_every_violation() {
        let batch = Batch {
            name: String::new(),
            lines: vec![
                Line { set_number: 1, notes: None },
                Line { set_number: 0, notes: Some("way too long".into()) },
            ],
        };
        let err = validate_input(&batch).unwrap_err();
        assert_matches!(err, CoreError::FieldValidation(fields) => {
            assert_eq!(fields["name"], "Name is required");
            assert_eq!(fields["lines[1].set_number"], "Set number must be between 1 and 50");
            assert_eq!(fields["lines[1].notes"], "Notes too long");
            assert_eq!(fields.len(), 3);
        });
    }

    #[test]
    fn valid_input_passes() {
        let line = Line { set_number: 50, notes: Some("ok".into()) };
        assert!(validate_input(&line).is_ok());
    }

    #[test]
    fn weight_precision() {
        assert!(validate_weight_precision(0.0).is_ok());
        assert!(validate_weight_precision(102.5).is_ok());
        assert!(validate_weight_precision(999.99).is_ok());
        assert!(validate_weight_precision(10.125).is_err());
        assert!(validate_weight_precision(f64::NAN).is_err());
    }

    #[test]
    fn exercise_name_pattern() {
        assert!(EXERCISE_NAME_RE.is_match("Bench Press (Incline)"));
        assert!(EXERCISE_NAME_RE.is_match("T-Bar Row"));
        assert!(!EXERCISE_NAME_RE.is_match("Squat!"));
        assert!(!EXERCISE_NAME_RE.is_match("Curl; DROP TABLE"));
    }

    #[test]
    fn username_pattern() {
        assert!(USERNAME_RE.is_match("lift_queen_42"));
        assert!(!USERNAME_RE.is_match("has space"));
    }

    #[test]
    fn not_blank() {
        assert!(validate_not_blank("  ").is_err());
        assert!(validate_not_blank(" a ").is_ok());
    }
}
