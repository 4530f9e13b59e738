//! Per-resource access decisions.
//!
//! A workout session is owned by exactly one user; workout exercises and sets
//! are owned transitively through their session. Resolving the owner (walking
//! set -> workout exercise -> session over active rows only) is the
//! repository's job; this module decides what the resolved owner means for
//! the acting principal.

use crate::error::CoreError;
use crate::status::UserRole;
use crate::types::DbId;

/// The caller, as established by a verified bearer token and the matching
/// user row.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Internal user id.
    pub user_id: DbId,
    /// Identity-provider subject (`sub` claim).
    pub subject: String,
    pub role: UserRole,
    /// Scope strings granted to the token.
    pub permissions: Vec<String>,
    pub email_verified: bool,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn has_permission(&self, scope: &str) -> bool {
        self.permissions.iter().any(|p| p == scope)
    }
}

/// Whether `principal` may touch a resource whose owner resolved to `owner`.
///
/// `None` means the resource does not exist or is soft-deleted; that is never
/// accessible, not even to an admin.
pub fn can_access(principal: &Principal, owner: Option<DbId>) -> bool {
    match owner {
        None => false,
        Some(_) if principal.is_admin() => true,
        Some(owner_id) => owner_id == principal.user_id,
    }
}

/// [`can_access`] turned into the outward error: absent resources become
/// `NotFound`, resources owned by someone else become `Forbidden`.
pub fn authorize_access(
    principal: &Principal,
    entity: &'static str,
    id: DbId,
    owner: Option<DbId>,
) -> Result<(), CoreError> {
    if can_access(principal, owner) {
        return Ok(());
    }
    match owner {
        None => Err(CoreError::NotFound { entity, id }),
        Some(_) => Err(CoreError::Forbidden(format!(
            "You do not have access to this {entity}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn principal(user_id: DbId, role: UserRole) -> Principal {
        Principal {
            user_id,
            subject: format!("auth0|{user_id}"),
            role,
            permissions: vec!["read:workouts".to_string()],
            email_verified: true,
        }
    }

    #[test]
    fn owner_can_access() {
        assert!(can_access(&principal(7, UserRole::User), Some(7)));
    }

    #[test]
    fn other_user_cannot_access() {
        assert!(!can_access(&principal(8, UserRole::User), Some(7)));
    }

    #[test]
    fn admin_can_access_any_existing_resource() {
        assert!(can_access(&principal(1, UserRole::Admin), Some(7)));
    }

    #[test]
    fn missing_resource_is_never_accessible() {
        assert!(!can_access(&principal(7, UserRole::User), None));
        assert!(!can_access(&principal(1, UserRole::Admin), None));
    }

    #[test]
    fn authorize_distinguishes_missing_from_foreign() {
        let p = principal(8, UserRole::User);
        assert_matches!(
            authorize_access(&p, "WorkoutSession", 3, None),
            Err(CoreError::NotFound { entity: "WorkoutSession", id: 3 })
        );
        assert_matches!(
            authorize_access(&p, "WorkoutSession", 3, Some(7)),
            Err(CoreError::Forbidden(_))
        );
        assert!(authorize_access(&p, "WorkoutSession", 3, Some(8)).is_ok());
    }

    #[test]
    fn has_permission_matches_exact_scope() {
        let p = principal(1, UserRole::User);
        assert!(p.has_permission("read:workouts"));
        assert!(!p.has_permission("write:workouts"));
    }
}
