//! Exercise library: admin-only writes and reference protection.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_exercise, create_session, delete_auth, get_auth,
    post_json_auth, put_json_auth, Identity,
};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_regular_user_cannot_create(pool: PgPool) {
    let alice = Identity::user("alice")
        .with_permissions(&["read:exercises", "write:exercises"])
        .token();
    let body = serde_json::json!({
        "name": "Bench Press",
        "exercise_type": "STRENGTH",
        "muscle_group": "CHEST",
        "difficulty": "BEGINNER",
    });
    let response = post_json_auth(build_test_app(pool), "/api/v1/exercises", &alice, body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_exercise_fields(pool: PgPool) {
    let admin = Identity::admin("root").token();
    let body = serde_json::json!({
        "name": "Squat!",
        "exercise_type": "STRENGTH",
        "muscle_group": "NECK",
        "difficulty": "BEGINNER",
    });
    let response = post_json_auth(build_test_app(pool), "/api/v1/exercises", &admin, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = body_json(response).await["errors"].clone();
    assert!(errors["name"].is_string());
    assert!(errors["muscle_group"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_by_type(pool: PgPool) {
    let app = build_test_app(pool);
    create_exercise(app.clone(), "Bench Press", "STRENGTH").await;
    create_exercise(app.clone(), "Running", "CARDIO").await;
    let alice = Identity::user("alice").token();

    let json = body_json(get_auth(app, "/api/v1/exercises?type=cardio", &alice).await).await;
    assert_eq!(json["data"]["total_elements"], 1);
    assert_eq!(json["data"]["items"][0]["name"], "Running");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_referenced_exercise_cannot_be_deleted_or_retyped(pool: PgPool) {
    let app = build_test_app(pool);
    let exercise_id = create_exercise(app.clone(), "Bench Press", "STRENGTH").await;
    let unused_id = create_exercise(app.clone(), "Cable Fly", "STRENGTH").await;
    let alice = Identity::user("alice").token();
    let admin = Identity::admin("root").token();
    create_session(app.clone(), &alice, exercise_id).await;

    let response = delete_auth(app.clone(), &format!("/api/v1/exercises/{exercise_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let retype = serde_json::json!({
        "name": "Bench Press",
        "exercise_type": "CARDIO",
        "muscle_group": "CHEST",
        "difficulty": "BEGINNER",
        "version": 0,
    });
    let response = put_json_auth(app.clone(), &format!("/api/v1/exercises/{exercise_id}"), &admin, retype).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = delete_auth(app.clone(), &format!("/api/v1/exercises/{unused_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &format!("/api/v1/exercises/{unused_id}"), &alice).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
