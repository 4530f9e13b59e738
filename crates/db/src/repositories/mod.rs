//! Repositories: zero-sized structs with async associated functions taking
//! a `&PgPool`.

pub mod exercise_repo;
pub mod exercise_set_repo;
pub mod ownership_repo;
pub mod soft_delete_repo;
pub mod user_repo;
pub mod workout_exercise_repo;
pub mod workout_session_repo;

pub use exercise_repo::ExerciseRepo;
pub use exercise_set_repo::{CardioSetRepo, ExerciseSetRepo, FlexibilitySetRepo, StrengthSetRepo};
pub use ownership_repo::OwnershipRepo;
pub use soft_delete_repo::{SoftDeleteEntity, SoftDeleteRepo};
pub use user_repo::UserRepo;
pub use workout_exercise_repo::WorkoutExerciseRepo;
pub use workout_session_repo::WorkoutSessionRepo;
