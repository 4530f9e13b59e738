//! User provisioning, registration, and existence checks.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_app_with, delete_auth, get, get_auth, post_json_auth,
    test_config, Identity,
};
use repwise_api::middleware::rate_limit::PolicyLimit;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_first_request_provisions_profile(pool: PgPool) {
    let token = Identity::user("alice").token();
    let response = get_auth(build_test_app(pool), "/api/v1/users/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "alice@example.com");
    assert_eq!(json["data"]["username"], "alice");
    assert_eq!(json["data"]["role"], "USER");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_role_follows_token(pool: PgPool) {
    let token = Identity::admin("root").token();
    let json = body_json(get_auth(build_test_app(pool), "/api/v1/users/me", &token).await).await;
    assert_eq!(json["data"]["role"], "ADMIN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_then_conflicts(pool: PgPool) {
    let app = build_test_app(pool);
    let alice = Identity::user("alice").token();
    let bob = Identity::user("bob").token();

    let response = post_json_auth(
        app.clone(),
        "/api/v1/users",
        &alice,
        serde_json::json!({ "username": "lifter_1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["username"], "lifter_1");

    let response = post_json_auth(
        app.clone(),
        "/api/v1/users",
        &alice,
        serde_json::json!({ "username": "another_name" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT, "one profile per subject");

    let response = post_json_auth(
        app,
        "/api/v1/users",
        &bob,
        serde_json::json!({ "username": "LIFTER_1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT, "usernames are case-insensitive");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_existence_checks_are_public(pool: PgPool) {
    let app = build_test_app(pool);
    let token = Identity::user("alice").token();
    get_auth(app.clone(), "/api/v1/users/me", &token).await;

    let json = body_json(get(app.clone(), "/api/v1/users/exists/username/alice").await).await;
    assert_eq!(json["data"]["exists"], true);

    let json = body_json(get(app, "/api/v1/users/exists/email/nobody@example.com").await).await;
    assert_eq!(json["data"]["exists"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_existence_checks_are_rate_limited(pool: PgPool) {
    let mut config = test_config();
    config.rate_limits.existence_check = PolicyLimit::per_minute(2);
    let app = build_test_app_with(pool, config);

    for _ in 0..2 {
        let response = get(app.clone(), "/api/v1/users/exists/username/alice").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get(app, "/api/v1/users/exists/username/alice").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
    assert!(response.headers().contains_key("x-ratelimit-reset"));
    assert_eq!(body_json(response).await["code"], "RATE_LIMITED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_api_calls_are_rate_limited_per_subject(pool: PgPool) {
    let mut config = test_config();
    config.rate_limits.api = PolicyLimit::per_minute(3);
    let app = build_test_app_with(pool, config);
    let alice = Identity::user("alice").token();
    let bob = Identity::user("bob").token();

    for _ in 0..3 {
        assert_eq!(get_auth(app.clone(), "/api/v1/users/me", &alice).await.status(), StatusCode::OK);
    }
    let response = get_auth(app.clone(), "/api/v1/users/me", &alice).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = get_auth(app, "/api/v1/users/me", &bob).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleted_user_is_locked_out_until_restored(pool: PgPool) {
    let app = build_test_app(pool);
    let admin = Identity::admin("root").token();
    let alice = Identity::user("alice").token();

    let json = body_json(get_auth(app.clone(), "/api/v1/users/me", &alice).await).await;
    let alice_id = json["data"]["id"].as_i64().unwrap();

    let response = delete_auth(app.clone(), &format!("/api/v1/users/{alice_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), "/api/v1/users/me", &alice).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/users/{alice_id}/restore"),
        &admin,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app, "/api/v1/users/me", &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_cannot_delete_self(pool: PgPool) {
    let app = build_test_app(pool);
    let admin = Identity::admin("root").token();
    let json = body_json(get_auth(app.clone(), "/api/v1/users/me", &admin).await).await;
    let admin_id = json["data"]["id"].as_i64().unwrap();

    let response = delete_auth(app.clone(), &format!("/api/v1/users/{admin_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete_auth(app, &format!("/api/v1/admin/users/{admin_id}/purge"), &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
