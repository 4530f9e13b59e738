#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use repwise_core::clock::FixedClock;
use repwise_core::scopes;
use sqlx::PgPool;
use tower::ServiceExt;

use repwise_api::auth::jwt::{Audience, AuthConfig, Claims};
use repwise_api::config::ServerConfig;
use repwise_api::middleware::rate_limit::{PolicyLimit, RateLimitConfig};
use repwise_api::router::build_app_router;
use repwise_api::state::AppState;

pub const SECRET: &[u8] = b"integration-test-secret-with-enough-bytes";
pub const ISSUER: &str = "https://repwise.test/";
pub const AUDIENCE: &str = "https://api.repwise.test";

/// Build a test `ServerConfig` with HS256 auth and limits high enough that
/// only the rate-limit tests ever hit them.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: String::new(),
        db_max_connections: 5,
        soft_delete_retention_days: 90,
        purge_interval_secs: 86_400,
        seed_exercises: false,
        auth: AuthConfig::hs256(ISSUER, AUDIENCE, SECRET),
        rate_limits: RateLimitConfig {
            account_creation: PolicyLimit::per_hour(1_000),
            existence_check: PolicyLimit::per_minute(1_000),
            api: PolicyLimit::per_minute(10_000),
            existence_jitter_ms: 0..=0,
        },
    }
}

/// Build the full application router, exactly as `main.rs` does, with the
/// clock pinned to the moment the app is built.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let router_config = config.clone();
    let clock = Arc::new(FixedClock::new(chrono::Utc::now()));
    let state = AppState::new(pool, config, clock);
    build_app_router(state, &router_config)
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// A test identity. `sub` doubles as the seed for the email.
#[derive(Debug, Clone)]
pub struct Identity {
    pub sub: String,
    pub email: String,
    pub email_verified: bool,
    pub permissions: Vec<String>,
    pub roles: Vec<String>,
}

impl Identity {
    /// A verified user holding every non-admin scope.
    pub fn user(name: &str) -> Self {
        Self {
            sub: format!("auth0|{name}"),
            email: format!("{name}@example.com"),
            email_verified: true,
            permissions: [
                scopes::READ_WORKOUTS,
                scopes::WRITE_WORKOUTS,
                scopes::DELETE_WORKOUTS,
                scopes::READ_EXERCISES,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            roles: vec![],
        }
    }

    /// A verified admin holding every scope.
    pub fn admin(name: &str) -> Self {
        Self {
            permissions: scopes::ALL_SCOPES.iter().map(|s| s.to_string()).collect(),
            roles: vec!["ADMIN".to_string()],
            ..Self::user(name)
        }
    }

    pub fn unverified(mut self) -> Self {
        self.email_verified = false;
        self
    }

    pub fn with_permissions(mut self, permissions: &[&str]) -> Self {
        self.permissions = permissions.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn token(&self) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: self.sub.clone(),
            email: Some(self.email.clone()),
            email_verified: self.email_verified,
            permissions: self.permissions.clone(),
            scope: None,
            roles: self.roles.clone(),
            iss: ISSUER.to_string(),
            aud: Audience::One(AUDIENCE.to_string()),
            exp: now + 900,
            iat: now,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET))
            .expect("test token should encode")
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router should not fail")
}

fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(t) => builder.header("authorization", format!("Bearer {t}")),
        None => builder,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, builder("GET", uri, None).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, builder("GET", uri, Some(token)).body(Body::empty()).unwrap()).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, builder("DELETE", uri, Some(token)).body(Body::empty()).unwrap()).await
}

async fn with_json(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let request = builder(method, uri, token)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    with_json(app, "POST", uri, None, body).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    with_json(app, "POST", uri, Some(token), body).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    with_json(app, "PUT", uri, Some(token), body).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    with_json(app, "PATCH", uri, Some(token), body).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a library exercise through the admin API and return its id.
pub async fn create_exercise(app: Router, name: &str, exercise_type: &str) -> i64 {
    let admin = Identity::admin("librarian").token();
    let body = serde_json::json!({
        "name": name,
        "exercise_type": exercise_type,
        "muscle_group": "CHEST",
        "difficulty": "BEGINNER",
    });
    let response = post_json_auth(app, "/api/v1/exercises", &admin, body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a session holding one entry for `exercise_id`; returns
/// `(session_id, workout_exercise_id)`.
pub async fn create_session(app: Router, token: &str, exercise_id: i64) -> (i64, i64) {
    let body = serde_json::json!({
        "name": "Push day",
        "exercises": [{ "exercise_id": exercise_id }],
    });
    let response = post_json_auth(app, "/api/v1/workouts", token, body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    let session_id = json["data"]["id"].as_i64().unwrap();
    let entry_id = json["data"]["exercises"][0]["id"].as_i64().unwrap();
    (session_id, entry_id)
}
