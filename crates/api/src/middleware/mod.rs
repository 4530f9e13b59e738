//! Request extractors and response middleware.
//!
//! - [`auth::BearerClaims`] -- a verified bearer token, nothing more.
//! - [`auth::AuthUser`] -- a verified token resolved to an active user row.
//! - [`rbac::Authorized`] -- [`auth::AuthUser`] holding a given scope.
//! - [`rbac::RequireAdmin`] -- [`rbac::Authorized`] with the `ADMIN` role.
//! - [`security::add_security_headers`] -- hardening headers on every response.
//! - [`rate_limit::RateLimiter`] -- token buckets shared through `AppState`.

pub mod auth;
pub mod rate_limit;
pub mod rbac;
pub mod security;
