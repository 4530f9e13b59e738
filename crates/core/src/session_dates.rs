//! Temporal consistency of a workout session's timestamps.

use crate::clock::Clock;
use crate::error::{CoreError, FieldErrors};
use crate::types::Timestamp;

/// `started_at` must not be in the future; `completed_at`, when present, must
/// be neither before `started_at` nor in the future.
///
/// All violations are reported together, keyed by field name.
pub fn check_session_dates(
    started_at: Option<Timestamp>,
    completed_at: Option<Timestamp>,
    clock: &dyn Clock,
) -> Result<(), CoreError> {
    let now = clock.now();
    let mut errors = FieldErrors::new();

    if let Some(started) = started_at {
        if started > now {
            errors.insert(
                "started_at".to_string(),
                "Start time cannot be in the future".to_string(),
            );
        }
    }

    if let Some(completed) = completed_at {
        if completed > now {
            errors.insert(
                "completed_at".to_string(),
                "Completion time cannot be in the future".to_string(),
            );
        } else if let Some(started) = started_at {
            if completed < started {
                errors.insert(
                    "completed_at".to_string(),
                    "Completion time cannot be before start time".to_string(),
                );
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::FieldValidation(errors))
    }
}
