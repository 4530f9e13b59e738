//! Workout session status state machine.
//!
//! ```text
//! PLANNED --start--> IN_PROGRESS --complete--> COMPLETED
//!                     |      ^
//!                   pause  resume
//!                     v      |
//!                     PAUSED
//!
//! PLANNED | IN_PROGRESS | PAUSED --cancel--> CANCELLED
//! ```
//!
//! COMPLETED and CANCELLED are terminal.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::WorkoutStatus;
use crate::types::Timestamp;

/// A requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutAction {
    Start,
    Pause,
    Resume,
    Complete,
    Cancel,
}

impl WorkoutAction {
    pub const ALL: &'static [WorkoutAction] = &[
        WorkoutAction::Start,
        WorkoutAction::Pause,
        WorkoutAction::Resume,
        WorkoutAction::Complete,
        WorkoutAction::Cancel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkoutAction::Start => "start",
            WorkoutAction::Pause => "pause",
            WorkoutAction::Resume => "resume",
            WorkoutAction::Complete => "complete",
            WorkoutAction::Cancel => "cancel",
        }
    }
}

impl std::fmt::Display for WorkoutAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WorkoutStatus {
    /// No transition leaves a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkoutStatus::Completed | WorkoutStatus::Cancelled)
    }
}

/// Resolve the status reached by applying `action` to `current`.
pub fn next_status(current: WorkoutStatus, action: WorkoutAction) -> Result<WorkoutStatus, CoreError> {
    use WorkoutAction as A;
    use WorkoutStatus as S;

    match (current, action) {
        (S::Planned, A::Start) => Ok(S::InProgress),
        (S::InProgress, A::Pause) => Ok(S::Paused),
        (S::Paused, A::Resume) => Ok(S::InProgress),
        (S::InProgress, A::Complete) => Ok(S::Completed),
        (S::Planned | S::InProgress | S::Paused, A::Cancel) => Ok(S::Cancelled),
        _ => Err(CoreError::Validation(format!(
            "Invalid status transition: cannot {action} a workout session that is {current}"
        ))),
    }
}

/// Timestamps that a transition may stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionTimes {
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub duration_minutes: Option<i32>,
}

/// Apply `action` and compute the timestamps the new status implies.
///
/// `start` stamps `started_at` unless it was already recorded; `complete`
/// stamps `completed_at` and derives `duration_minutes` from `started_at`.
pub fn apply_transition(
    current: WorkoutStatus,
    action: WorkoutAction,
    times: SessionTimes,
    now: Timestamp,
) -> Result<(WorkoutStatus, SessionTimes), CoreError> {
    let next = next_status(current, action)?;
    let mut times = times;

    match action {
        WorkoutAction::Start => {
            times.started_at = times.started_at.or(Some(now));
        }
        WorkoutAction::Complete => {
            times.completed_at = Some(now);
            if let Some(started) = times.started_at {
                let minutes = (now - started).num_minutes().clamp(0, i64::from(i32::MAX));
                times.duration_minutes = Some(minutes as i32);
            }
        }
        WorkoutAction::Pause | WorkoutAction::Resume | WorkoutAction::Cancel => {}
    }

    Ok((next, times))
}
