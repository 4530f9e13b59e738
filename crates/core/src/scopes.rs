//! Permission strings granted by the identity provider.
//!
//! A verified token carries these in its `permissions` array (or the
//! space-separated `scope` claim). They gate coarse-grained capability;
//! per-resource ownership is checked separately.

pub const READ_WORKOUTS: &str = "read:workouts";
pub const WRITE_WORKOUTS: &str = "write:workouts";
pub const DELETE_WORKOUTS: &str = "delete:workouts";

pub const READ_EXERCISES: &str = "read:exercises";
pub const WRITE_EXERCISES: &str = "write:exercises";
pub const DELETE_EXERCISES: &str = "delete:exercises";

/// Admin-only.
pub const READ_USERS: &str = "read:users";
/// Admin-only.
pub const DELETE_USERS: &str = "delete:users";

/// Every scope the API understands.
pub const ALL_SCOPES: &[&str] = &[
    READ_WORKOUTS,
    WRITE_WORKOUTS,
    DELETE_WORKOUTS,
    READ_EXERCISES,
    WRITE_EXERCISES,
    DELETE_EXERCISES,
    READ_USERS,
    DELETE_USERS,
];
