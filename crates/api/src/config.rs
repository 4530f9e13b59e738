use std::str::FromStr;

use crate::auth::jwt::AuthConfig;
use crate::middleware::rate_limit::RateLimitConfig;

/// A required environment variable is missing or unparsable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Server configuration loaded from environment variables.
///
/// Everything except the database URL and the auth settings has a default
/// suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Soft-deleted rows older than this many days are purged (default: `90`).
    pub soft_delete_retention_days: i64,
    /// Interval between retention runs (default: one day).
    pub purge_interval_secs: u64,
    /// Insert the built-in exercise library on an empty table at startup.
    pub seed_exercises: bool,
    pub auth: AuthConfig,
    pub rate_limits: RateLimitConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                    |
    /// |------------------------------|----------------------------|
    /// | `HOST`                       | `0.0.0.0`                  |
    /// | `PORT`                       | `8080`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                       |
    /// | `DATABASE_URL`               | **required**               |
    /// | `DB_MAX_CONNECTIONS`         | `20`                       |
    /// | `SOFT_DELETE_RETENTION_DAYS` | `90`                       |
    /// | `PURGE_INTERVAL_SECS`        | `86400`                    |
    /// | `SEED_EXERCISES`             | `true`                     |
    ///
    /// Auth variables are documented on [`AuthConfig::from_env`], rate limits
    /// on [`RateLimitConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = env_or("PORT", 8080u16)?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            origin
                .parse::<axum::http::HeaderValue>()
                .map_err(|e| ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    reason: format!("'{origin}': {e}"),
                })?;
        }

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30u64)?,
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 20u32)?,
            soft_delete_retention_days: env_or("SOFT_DELETE_RETENTION_DAYS", 90i64)?,
            purge_interval_secs: env_or("PURGE_INTERVAL_SECS", 86_400u64)?,
            seed_exercises: env_or("SEED_EXERCISES", true)?,
            auth: AuthConfig::from_env()?,
            rate_limits: RateLimitConfig::from_env()?,
        })
    }
}

/// Parse `var` if set, otherwise fall back to `default`.
pub(crate) fn env_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_or(var, std::env::var(var).ok(), default)
}

/// Parse `raw` as the value of `var`, or `default` when it is absent.
pub(crate) fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
