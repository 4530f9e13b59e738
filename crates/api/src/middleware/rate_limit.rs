//! In-process token-bucket rate limiting.
//!
//! Buckets live in a [`DashMap`] keyed by `(policy, key)`, where the key is a
//! client IP or a user subject depending on the policy. Each bucket starts
//! full and refills continuously at `capacity / period`.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use dashmap::DashMap;
use rand::Rng;
use repwise_core::error::CoreError;
use repwise_core::types::Timestamp;

use crate::config::{parse_or, ConfigError};

/// Which limit applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatePolicy {
    /// Explicit profile registration, per client IP.
    AccountCreation,
    /// Username / email existence probes, per client IP.
    ExistenceCheck,
    /// Every authenticated request, per user.
    Api,
}

impl RatePolicy {
    pub fn name(self) -> &'static str {
        match self {
            RatePolicy::AccountCreation => "account_creation",
            RatePolicy::ExistenceCheck => "existence_check",
            RatePolicy::Api => "api",
        }
    }
}

/// `capacity` requests per `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyLimit {
    pub capacity: u32,
    pub period: Duration,
}

impl PolicyLimit {
    pub const fn per_minute(capacity: u32) -> Self {
        Self {
            capacity,
            period: Duration::from_secs(60),
        }
    }

    pub const fn per_hour(capacity: u32) -> Self {
        Self {
            capacity,
            period: Duration::from_secs(3600),
        }
    }

    fn refill_per_sec(&self) -> f64 {
        f64::from(self.capacity) / self.period.as_secs_f64().max(f64::EPSILON)
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub account_creation: PolicyLimit,
    pub existence_check: PolicyLimit,
    pub api: PolicyLimit,
    /// Random delay added to every existence-check response, in milliseconds.
    pub existence_jitter_ms: RangeInclusive<u64>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            account_creation: PolicyLimit::per_hour(10),
            existence_check: PolicyLimit::per_minute(10),
            api: PolicyLimit::per_minute(300),
            existence_jitter_ms: 50..=150,
        }
    }
}

impl RateLimitConfig {
    /// Load limits from the environment, falling back to [`Default`].
    ///
    /// | Env Var                                 | Default |
    /// |-----------------------------------------|---------|
    /// | `RATE_LIMIT_ACCOUNT_CREATION_PER_HOUR`  | `10`    |
    /// | `RATE_LIMIT_EXISTENCE_CHECK_PER_MINUTE` | `10`    |
    /// | `RATE_LIMIT_API_PER_MINUTE`             | `300`   |
    /// | `EXISTENCE_JITTER_MIN_MS`               | `50`    |
    /// | `EXISTENCE_JITTER_MAX_MS`               | `150`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// [`RateLimitConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let read = |var: &'static str, default: u64| parse_or(var, lookup(var), default);
        let capacity = |var: &'static str, default: u32| -> Result<u32, ConfigError> {
            let value = parse_or(var, lookup(var), default)?;
            if value == 0 {
                return Err(ConfigError::Invalid {
                    var,
                    reason: "must be at least 1".into(),
                });
            }
            Ok(value)
        };

        let jitter_min = read("EXISTENCE_JITTER_MIN_MS", *defaults.existence_jitter_ms.start())?;
        let jitter_max = read("EXISTENCE_JITTER_MAX_MS", *defaults.existence_jitter_ms.end())?;
        if jitter_min > jitter_max {
            return Err(ConfigError::Invalid {
                var: "EXISTENCE_JITTER_MIN_MS",
                reason: format!("{jitter_min} exceeds EXISTENCE_JITTER_MAX_MS ({jitter_max})"),
            });
        }

        Ok(Self {
            account_creation: PolicyLimit::per_hour(capacity(
                "RATE_LIMIT_ACCOUNT_CREATION_PER_HOUR",
                defaults.account_creation.capacity,
            )?),
            existence_check: PolicyLimit::per_minute(capacity(
                "RATE_LIMIT_EXISTENCE_CHECK_PER_MINUTE",
                defaults.existence_check.capacity,
            )?),
            api: PolicyLimit::per_minute(capacity(
                "RATE_LIMIT_API_PER_MINUTE",
                defaults.api.capacity,
            )?),
            existence_jitter_ms: jitter_min..=jitter_max,
        })
    }

    pub fn limit(&self, policy: RatePolicy) -> PolicyLimit {
        match policy {
            RatePolicy::AccountCreation => self.account_creation,
            RatePolicy::ExistenceCheck => self.existence_check,
            RatePolicy::Api => self.api,
        }
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Shared token buckets for every policy.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: DashMap<(RatePolicy, String), Bucket>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: DashMap::new(),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Take one token for `(policy, key)`.
    ///
    /// `now` only stamps the reset time reported to the client.
    pub fn check(&self, policy: RatePolicy, key: &str, now: Timestamp) -> Result<(), CoreError> {
        self.check_at(policy, key, Instant::now(), now)
    }

    fn check_at(
        &self,
        policy: RatePolicy,
        key: &str,
        instant: Instant,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        let limit = self.config.limit(policy);
        let capacity = f64::from(limit.capacity);
        let rate = limit.refill_per_sec();

        let mut bucket = self
            .buckets
            .entry((policy, key.to_string()))
            .or_insert_with(|| Bucket {
                tokens: capacity,
                last_refill: instant,
            });

        let elapsed = instant.saturating_duration_since(bucket.last_refill);
        bucket.tokens = (bucket.tokens + elapsed.as_secs_f64() * rate).min(capacity);
        bucket.last_refill = instant;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return Ok(());
        }

        let wait_secs = ((1.0 - bucket.tokens) / rate).ceil().max(1.0) as u64;
        drop(bucket);

        tracing::warn!(policy = policy.name(), key, retry_after = wait_secs, "Rate limit exceeded");
        Err(CoreError::RateLimited {
            retry_after_secs: wait_secs,
            reset_at: now + chrono::Duration::seconds(wait_secs as i64),
        })
    }

    /// A random delay inside the configured existence-check jitter window.
    pub fn jitter(&self) -> Duration {
        let range = self.config.existence_jitter_ms.clone();
        if range.is_empty() {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(range))
    }

    /// Drop buckets untouched for longer than `idle`. Returns how many were
    /// removed.
    pub fn prune_idle(&self, idle: Duration) -> usize {
        let before = self.buckets.len();
        let now = Instant::now();
        self.buckets
            .retain(|_, b| now.saturating_duration_since(b.last_refill) < idle);
        before - self.buckets.len()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

/// Best-effort client address: first `X-Forwarded-For` hop, then the socket
/// peer, then `"unknown"`.
pub fn client_ip(parts: &Parts) -> String {
    if let Some(forwarded) = parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// The caller's address as seen by [`client_ip`].
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(client_ip(parts)))
    }
}
