//! Access-token verification.
//!
//! Tokens are RS256-signed by the identity provider in production. HS256 with
//! a shared secret is accepted for local development and tests. Issuer,
//! audience, and expiry are always checked.

use std::fmt;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use repwise_core::roles::{UserRole, ROLE_ADMIN};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Audience claim: a single string or a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// Claims carried by an identity-provider access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity-provider subject, e.g. `auth0|64f...`.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    /// Granted permissions as an array.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Granted permissions as a space-separated string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: Audience,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Union of `permissions` and the entries of `scope`, deduplicated.
    pub fn effective_permissions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.permissions.len());
        let from_scope = self.scope.as_deref().unwrap_or_default().split_whitespace();
        for p in self.permissions.iter().map(String::as_str).chain(from_scope) {
            if !p.is_empty() && !out.iter().any(|q| q == p) {
                out.push(p.to_string());
            }
        }
        out
    }

    /// `ADMIN` when the token grants the admin role, `USER` otherwise.
    pub fn role(&self) -> UserRole {
        if self.roles.iter().any(|r| r.eq_ignore_ascii_case(ROLE_ADMIN)) {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }
}

/// Token verification settings.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected `iss`, e.g. `https://tenant.auth0.com/`.
    pub issuer: String,
    /// Expected `aud`.
    pub audience: String,
    algorithm: Algorithm,
    decoding_key: DecodingKey,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    /// Load token verification settings from environment variables.
    ///
    /// | Env Var               | Required |
    /// |-----------------------|----------|
    /// | `AUTH_ISSUER`         | **yes**  |
    /// | `AUTH_AUDIENCE`       | **yes**  |
    /// | `AUTH_PUBLIC_KEY_PEM` | one of   |
    /// | `AUTH_HS256_SECRET`   | one of   |
    pub fn from_env() -> Result<Self, ConfigError> {
        let issuer = required("AUTH_ISSUER")?;
        let audience = required("AUTH_AUDIENCE")?;
        let pem = std::env::var("AUTH_PUBLIC_KEY_PEM").ok().filter(|v| !v.is_empty());
        let secret = std::env::var("AUTH_HS256_SECRET").ok().filter(|v| !v.is_empty());

        match (pem, secret) {
            (Some(pem), None) => Self::rs256(issuer, audience, pem.as_bytes()).map_err(|e| {
                ConfigError::Invalid {
                    var: "AUTH_PUBLIC_KEY_PEM",
                    reason: e.to_string(),
                }
            }),
            (None, Some(secret)) => Ok(Self::hs256(issuer, audience, secret.as_bytes())),
            (Some(_), Some(_)) => Err(ConfigError::Invalid {
                var: "AUTH_HS256_SECRET",
                reason: "set either AUTH_PUBLIC_KEY_PEM or AUTH_HS256_SECRET, not both".into(),
            }),
            (None, None) => Err(ConfigError::Missing("AUTH_PUBLIC_KEY_PEM")),
        }
    }

    /// Verify RS256 tokens with a PEM-encoded public key.
    pub fn rs256(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        pem: &[u8],
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self {
            issuer: issuer.into(),
            audience: audience.into(),
            algorithm: Algorithm::RS256,
            decoding_key: DecodingKey::from_rsa_pem(pem)?,
        })
    }

    /// Verify HS256 tokens with a shared secret.
    pub fn hs256(issuer: impl Into<String>, audience: impl Into<String>, secret: &[u8]) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            algorithm: Algorithm::HS256,
            decoding_key: DecodingKey::from_secret(secret),
        }
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(var))
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Checks the signature, `exp`, `iss`, and `aud`.
pub fn validate_token(
    token: &str,
    config: &AuthConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(config.algorithm);
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);
    validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
    let token_data = decode::<Claims>(token, &config.decoding_key, &validation)?;
    Ok(token_data.claims)
}
