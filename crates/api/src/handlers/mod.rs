pub mod access;
pub mod admin;
pub mod exercises;
pub mod sets;
pub mod users;
pub mod workout_exercises;
pub mod workout_sessions;
