//! Scope- and role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects the request with 403 when
//! the token lacks the scope, when a write scope is used with an unverified
//! email, or when the role is insufficient. Checks run in that order, before
//! the request body is read.

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use repwise_core::error::CoreError;
use repwise_core::scopes;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// A permission string a route requires.
pub trait Scope: Send + Sync + 'static {
    const SCOPE: &'static str;
    /// Writes and deletes also require a verified email.
    const MUTATES: bool;
}

macro_rules! scope {
    ($(#[$meta:meta])* $name:ident, $value:expr, $mutates:expr) => {
        $(#[$meta])*
        pub struct $name;

        impl Scope for $name {
            const SCOPE: &'static str = $value;
            const MUTATES: bool = $mutates;
        }
    };
}

scope!(ReadWorkouts, scopes::READ_WORKOUTS, false);
scope!(WriteWorkouts, scopes::WRITE_WORKOUTS, true);
scope!(DeleteWorkouts, scopes::DELETE_WORKOUTS, true);
scope!(ReadExercises, scopes::READ_EXERCISES, false);
scope!(WriteExercises, scopes::WRITE_EXERCISES, true);
scope!(DeleteExercises, scopes::DELETE_EXERCISES, true);
scope!(ReadUsers, scopes::READ_USERS, false);
scope!(DeleteUsers, scopes::DELETE_USERS, true);

/// Reject `user` unless it holds `S`, with a verified email for writes.
pub fn check_scope<S: Scope>(user: &AuthUser) -> Result<(), AppError> {
    if !user.principal.has_permission(S::SCOPE) {
        tracing::warn!(user_id = user.user_id(), scope = S::SCOPE, "Missing scope");
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Missing required permission: {}",
            S::SCOPE
        ))));
    }
    if S::MUTATES && !user.principal.email_verified {
        tracing::warn!(user_id = user.user_id(), scope = S::SCOPE, "Unverified email on write");
        return Err(AppError::Core(CoreError::Forbidden(
            "Email address must be verified".into(),
        )));
    }
    Ok(())
}

/// Requires scope `S`.
///
/// ```ignore
/// async fn list(Authorized(user, _): Authorized<ReadWorkouts>) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct Authorized<S: Scope>(pub AuthUser, pub PhantomData<S>);

impl<S: Scope> FromRequestParts<AppState> for Authorized<S> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        check_scope::<S>(&user)?;
        Ok(Authorized(user, PhantomData))
    }
}

/// Requires scope `S` and the `ADMIN` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAdmin<S: Scope>(pub AuthUser, pub PhantomData<S>);

impl<S: Scope> FromRequestParts<AppState> for RequireAdmin<S> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Authorized(user, _) = Authorized::<S>::from_request_parts(parts, state).await?;
        if !user.principal.is_admin() {
            tracing::warn!(user_id = user.user_id(), "Admin role required");
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user, PhantomData))
    }
}
