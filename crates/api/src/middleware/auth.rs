//! Bearer-token authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use repwise_core::error::CoreError;
use repwise_core::ownership::Principal;
use repwise_db::models::user::User;
use repwise_db::repositories::UserRepo;

use crate::auth::jwt::{validate_token, Claims};
use crate::error::AppError;
use crate::middleware::rate_limit::RatePolicy;
use crate::state::AppState;

/// Claims of a verified bearer token, without touching the database.
///
/// Used where the caller's user row may not exist yet, such as explicit
/// registration.
#[derive(Debug, Clone)]
pub struct BearerClaims(pub Claims);

impl FromRequestParts<AppState> for BearerClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.auth).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(BearerClaims(claims))
    }
}

/// Authenticated caller backed by an active user row.
///
/// The row is provisioned on the first request carrying a new subject, and
/// its stored role follows the token's `roles` claim. Each extraction takes
/// one token from the caller's `api` rate-limit bucket.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.principal.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub principal: Principal,
    pub user: User,
}

impl AuthUser {
    pub fn user_id(&self) -> repwise_core::types::DbId {
        self.principal.user_id
    }

    /// Audit label written to `created_by` / `updated_by`.
    pub fn actor(&self) -> Option<&str> {
        Some(self.principal.subject.as_str())
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerClaims(claims) = BearerClaims::from_request_parts(parts, state).await?;

        state
            .rate_limiter
            .check(RatePolicy::Api, &claims.sub, state.clock.now())?;

        let email = claims.email.as_deref().ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Token does not carry an email claim".into(),
            ))
        })?;

        let mut user =
            UserRepo::upsert_from_identity(&state.pool, &claims.sub, email, claims.email_verified)
                .await?;

        if user.deleted {
            tracing::warn!(user_id = user.id, "Request from a deleted account");
            return Err(AppError::Core(CoreError::Forbidden(
                "This account has been deleted".into(),
            )));
        }

        let role = claims.role();
        if user.role != role {
            tracing::info!(user_id = user.id, from = %user.role, to = %role, "Syncing user role");
            user = UserRepo::sync_role(&state.pool, user.id, role).await?;
        }

        let principal = Principal {
            user_id: user.id,
            subject: user.subject.clone(),
            role: user.role,
            permissions: claims.effective_permissions(),
            email_verified: user.email_verified,
        };

        Ok(AuthUser { principal, user })
    }
}
