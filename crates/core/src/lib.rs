//! Domain rules for the repwise workout tracker.
//!
//! Everything in this crate is pure: no database, no HTTP. The `db` and
//! `api` crates build on these types and rules.

pub mod clock;
pub mod error;
pub mod exercise;
pub mod ownership;
pub mod pagination;
pub mod roles;
pub mod scopes;
pub mod session_dates;
pub mod set_consistency;
pub mod status;
pub mod types;
pub mod validation;
pub mod workout_status;
