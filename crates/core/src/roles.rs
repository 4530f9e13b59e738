//! Well-known role name constants.
//!
//! These must match the seed data in `20261001000001_create_lookup_tables.sql`.

pub use crate::status::UserRole;

pub const ROLE_USER: &str = "USER";
pub const ROLE_ADMIN: &str = "ADMIN";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_constants_match_enum_labels() {
        assert_eq!(UserRole::User.label(), ROLE_USER);
        assert_eq!(UserRole::Admin.label(), ROLE_ADMIN);
    }
}
