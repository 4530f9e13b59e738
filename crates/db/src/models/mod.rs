//! Entity models and DTOs.
//!
//! Row structs derive `sqlx::FromRow` + `Serialize`; request DTOs derive
//! `Deserialize` + `validator::Validate` and carry the field constraints.

pub mod exercise;
pub mod exercise_set;
pub mod user;
pub mod workout_exercise;
pub mod workout_session;
