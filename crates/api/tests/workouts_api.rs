//! Workout sessions over HTTP: ownership, cascading soft delete, status
//! transitions, and optimistic locking.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_exercise, create_session, delete_auth, get_auth,
    patch_json_auth, post_json_auth, put_json_auth, Identity,
};
use sqlx::PgPool;

async fn status_change(
    app: axum::Router,
    token: &str,
    session_id: i64,
    action: &str,
) -> (StatusCode, serde_json::Value) {
    let uri = format!("/api/v1/workouts/{session_id}");
    let current = body_json(get_auth(app.clone(), &uri, token).await).await;
    let version = current["data"]["version"].clone();
    let body = serde_json::json!({ "action": action, "version": version });
    let response = patch_json_auth(app, &format!("{uri}/status"), token, body).await;
    let status = response.status();
    (status, body_json(response).await)
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_owner_reads_own_session(pool: PgPool) {
    let app = build_test_app(pool);
    let exercise_id = create_exercise(app.clone(), "Bench Press", "STRENGTH").await;
    let alice = Identity::user("alice").token();
    let (session_id, _) = create_session(app.clone(), &alice, exercise_id).await;

    let response = get_auth(app, &format!("/api/v1/workouts/{session_id}"), &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "PLANNED");
    assert_eq!(json["data"]["exercises"][0]["exercise"]["name"], "Bench Press");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_foreign_session_is_403_and_missing_is_404(pool: PgPool) {
    let app = build_test_app(pool);
    let exercise_id = create_exercise(app.clone(), "Bench Press", "STRENGTH").await;
    let alice = Identity::user("alice").token();
    let bob = Identity::user("bob").token();
    let (session_id, entry_id) = create_session(app.clone(), &alice, exercise_id).await;

    let response = get_auth(app.clone(), &format!("/api/v1/workouts/{session_id}"), &bob).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app.clone(), &format!("/api/v1/workout-exercises/{entry_id}"), &bob).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &format!("/api/v1/workouts/{session_id}"), &bob).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, "/api/v1/workouts/999999", &bob).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_reads_any_session(pool: PgPool) {
    let app = build_test_app(pool);
    let exercise_id = create_exercise(app.clone(), "Bench Press", "STRENGTH").await;
    let alice = Identity::user("alice").token();
    let admin = Identity::admin("root").token();
    let (session_id, _) = create_session(app.clone(), &alice, exercise_id).await;

    let response = get_auth(app, &format!("/api/v1/workouts/{session_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_only_shows_own_sessions(pool: PgPool) {
    let app = build_test_app(pool);
    let exercise_id = create_exercise(app.clone(), "Bench Press", "STRENGTH").await;
    let alice = Identity::user("alice").token();
    let bob = Identity::user("bob").token();
    create_session(app.clone(), &alice, exercise_id).await;
    create_session(app.clone(), &alice, exercise_id).await;
    create_session(app.clone(), &bob, exercise_id).await;

    let json = body_json(get_auth(app, "/api/v1/workouts?size=1", &alice).await).await;
    assert_eq!(json["data"]["total_elements"], 2);
    assert_eq!(json["data"]["total_pages"], 2);
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_unknown_exercise_is_404(pool: PgPool) {
    let alice = Identity::user("alice").token();
    let body = serde_json::json!({ "name": "Ghost day", "exercises": [{ "exercise_id": 424242 }] });
    let response = post_json_auth(build_test_app(pool), "/api/v1/workouts", &alice, body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_rejects_future_start(pool: PgPool) {
    let alice = Identity::user("alice").token();
    let tomorrow = chrono::Utc::now() + chrono::Duration::days(1);
    let body = serde_json::json!({ "name": "Time travel", "started_at": tomorrow });
    let response = post_json_auth(build_test_app(pool), "/api/v1/workouts", &alice, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["errors"]["started_at"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_sort_field_is_400(pool: PgPool) {
    let alice = Identity::user("alice").token();
    let response = get_auth(build_test_app(pool), "/api/v1/workouts?sort=password", &alice).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Soft delete and restore
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_cascades_and_restore_brings_children_back(pool: PgPool) {
    let app = build_test_app(pool);
    let exercise_id = create_exercise(app.clone(), "Bench Press", "STRENGTH").await;
    let alice = Identity::user("alice").token();
    let (session_id, entry_id) = create_session(app.clone(), &alice, exercise_id).await;

    let set = serde_json::json!({ "set_number": 1, "reps": 8, "weight": 60.0 });
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/workout-exercises/{entry_id}/strength-sets"),
        &alice,
        set,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let set_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = delete_auth(app.clone(), &format!("/api/v1/workouts/{session_id}"), &alice).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for uri in [
        format!("/api/v1/workouts/{session_id}"),
        format!("/api/v1/workout-exercises/{entry_id}"),
        format!("/api/v1/strength-sets/{set_id}"),
    ] {
        let response = get_auth(app.clone(), &uri, &alice).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let json = body_json(get_auth(app.clone(), "/api/v1/workouts/deleted", &alice).await).await;
    assert_eq!(json["data"]["items"][0]["id"], session_id);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/workouts/{session_id}/restore"),
        &alice,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app, &format!("/api/v1/strength-sets/{set_id}"), &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleted_set_stays_deleted_after_session_restore(pool: PgPool) {
    let app = build_test_app(pool);
    let exercise_id = create_exercise(app.clone(), "Bench Press", "STRENGTH").await;
    let alice = Identity::user("alice").token();
    let (session_id, entry_id) = create_session(app.clone(), &alice, exercise_id).await;

    let sets_uri = format!("/api/v1/workout-exercises/{entry_id}/strength-sets");
    let set = serde_json::json!({ "set_number": 1, "reps": 5 });
    let response = post_json_auth(app.clone(), &sets_uri, &alice, set).await;
    let set_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = delete_auth(app.clone(), &format!("/api/v1/strength-sets/{set_id}"), &alice).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    delete_auth(app.clone(), &format!("/api/v1/workouts/{session_id}"), &alice).await;
    post_json_auth(
        app.clone(),
        &format!("/api/v1/workouts/{session_id}/restore"),
        &alice,
        serde_json::json!({}),
    )
    .await;

    let response = get_auth(app, &format!("/api/v1/strength-sets/{set_id}"), &alice).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_include_deleted_is_admin_only(pool: PgPool) {
    let app = build_test_app(pool);
    let alice = Identity::user("alice").token();
    let admin = Identity::admin("root").token();

    let response = get_auth(app.clone(), "/api/v1/workouts?includeDeleted=true", &alice).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, "/api/v1/workouts?includeDeleted=true", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_lifecycle_with_sets(pool: PgPool) {
    let app = build_test_app(pool);
    let exercise_id = create_exercise(app.clone(), "Bench Press", "STRENGTH").await;
    let alice = Identity::user("alice").token();
    let (session_id, entry_id) = create_session(app.clone(), &alice, exercise_id).await;

    let (status, json) = status_change(app.clone(), &alice, session_id, "start").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "IN_PROGRESS");
    assert!(json["data"]["started_at"].is_string());

    let (status, json) = status_change(app.clone(), &alice, session_id, "complete").await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "completing without sets must fail");
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let set = serde_json::json!({ "set_number": 1, "reps": 10, "weight": 40.5 });
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/workout-exercises/{entry_id}/strength-sets"),
        &alice,
        set,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let (status, json) = status_change(app.clone(), &alice, session_id, "complete").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "COMPLETED");
    assert!(json["data"]["completed_at"].is_string());
    assert!(json["data"]["duration_minutes"].is_number());

    let (status, _) = status_change(app, &alice, session_id, "start").await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "COMPLETED is terminal");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_transition_is_400(pool: PgPool) {
    let app = build_test_app(pool);
    let exercise_id = create_exercise(app.clone(), "Bench Press", "STRENGTH").await;
    let alice = Identity::user("alice").token();
    let (session_id, _) = create_session(app.clone(), &alice, exercise_id).await;

    let (status, _) = status_change(app.clone(), &alice, session_id, "pause").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = status_change(app, &alice, session_id, "cancel").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "CANCELLED");
}

// ---------------------------------------------------------------------------
// Optimistic locking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stale_version_is_409(pool: PgPool) {
    let app = build_test_app(pool);
    let exercise_id = create_exercise(app.clone(), "Bench Press", "STRENGTH").await;
    let alice = Identity::user("alice").token();
    let (session_id, _) = create_session(app.clone(), &alice, exercise_id).await;
    let uri = format!("/api/v1/workouts/{session_id}");

    let edit = |version: i64| serde_json::json!({ "name": "Renamed", "version": version });

    let response = put_json_auth(app.clone(), &uri, &alice, edit(0)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["version"], 1);

    let response = put_json_auth(app, &uri, &alice, edit(0)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "OPTIMISTIC_LOCK");
    assert_eq!(json["errors"]["expectedVersion"], "0");
    assert_eq!(json["errors"]["currentVersion"], "1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_start_after_recorded_completion_is_400(pool: PgPool) {
    let app = build_test_app(pool);
    let alice = Identity::user("alice").token();
    let an_hour_ago = chrono::Utc::now() - chrono::Duration::hours(1);
    let body = serde_json::json!({ "name": "Backfilled", "completed_at": an_hour_ago });
    let response = post_json_auth(app.clone(), "/api/v1/workouts", &alice, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let session_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let (status, json) = status_change(app.clone(), &alice, session_id, "start").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["errors"]["completed_at"].is_string());

    let json = body_json(get_auth(app, &format!("/api/v1/workouts/{session_id}"), &alice).await).await;
    assert_eq!(json["data"]["status"], "PLANNED");
}

// ---------------------------------------------------------------------------
// Body decoding
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mistyped_fields_are_all_reported(pool: PgPool) {
    let alice = Identity::user("alice").token();
    let body = serde_json::json!({ "name": 5, "started_at": "garbage" });
    let response = post_json_auth(build_test_app(pool), "/api/v1/workouts", &alice, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["errors"]["name"].is_string());
    assert!(json["errors"]["started_at"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_status_action_is_reported_by_field(pool: PgPool) {
    let app = build_test_app(pool);
    let exercise_id = create_exercise(app.clone(), "Bench Press", "STRENGTH").await;
    let alice = Identity::user("alice").token();
    let (session_id, _) = create_session(app.clone(), &alice, exercise_id).await;

    let body = serde_json::json!({ "action": "jump", "version": 0 });
    let uri = format!("/api/v1/workouts/{session_id}/status");
    let response = patch_json_auth(app, &uri, &alice, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["errors"]["action"].is_string());
}

// ---------------------------------------------------------------------------
// Ownership of writes
// ---------------------------------------------------------------------------

/// Alice's session with one entry and one strength set: `(session, entry, set)`.
async fn seeded_workout(app: axum::Router, token: &str) -> (i64, i64, i64) {
    let exercise_id = create_exercise(app.clone(), "Bench Press", "STRENGTH").await;
    let (session_id, entry_id) = create_session(app.clone(), token, exercise_id).await;
    let set = serde_json::json!({ "set_number": 1, "reps": 8 });
    let response = post_json_auth(
        app,
        &format!("/api/v1/workout-exercises/{entry_id}/strength-sets"),
        token,
        set,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let set_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    (session_id, entry_id, set_id)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_foreign_writes_are_403(pool: PgPool) {
    let app = build_test_app(pool);
    let alice = Identity::user("alice").token();
    let bob = Identity::user("bob").token();
    let (session_id, entry_id, set_id) = seeded_workout(app.clone(), &alice).await;

    let session_uri = format!("/api/v1/workouts/{session_id}");
    let entry_uri = format!("/api/v1/workout-exercises/{entry_id}");
    let set_uri = format!("/api/v1/strength-sets/{set_id}");

    let response = put_json_auth(
        app.clone(),
        &session_uri,
        &bob,
        serde_json::json!({ "name": "Mine now", "version": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN, "PUT session");

    let response = patch_json_auth(
        app.clone(),
        &format!("{session_uri}/status"),
        &bob,
        serde_json::json!({ "action": "cancel", "version": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN, "PATCH status");

    let response = put_json_auth(
        app.clone(),
        &entry_uri,
        &bob,
        serde_json::json!({ "order_index": 3, "version": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN, "PUT entry");

    let response = delete_auth(app.clone(), &entry_uri, &bob).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN, "DELETE entry");

    let response = put_json_auth(
        app.clone(),
        &set_uri,
        &bob,
        serde_json::json!({ "set_number": 1, "reps": 100, "version": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN, "PUT set");

    let response = delete_auth(app.clone(), &set_uri, &bob).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN, "DELETE set");

    // Nothing changed for the owner.
    let json = body_json(get_auth(app.clone(), &session_uri, &alice).await).await;
    assert_eq!(json["data"]["status"], "PLANNED");
    assert_eq!(json["data"]["version"], 0);
    let json = body_json(get_auth(app, &set_uri, &alice).await).await;
    assert_eq!(json["data"]["reps"], 8);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_edits_and_deletes_nested_resources(pool: PgPool) {
    let app = build_test_app(pool);
    let alice = Identity::user("alice").token();
    let admin = Identity::admin("root").token();
    let (_, entry_id, set_id) = seeded_workout(app.clone(), &alice).await;

    let entry_uri = format!("/api/v1/workout-exercises/{entry_id}");
    let set_uri = format!("/api/v1/strength-sets/{set_id}");

    let response = put_json_auth(
        app.clone(),
        &entry_uri,
        &admin,
        serde_json::json!({ "order_index": 2, "notes": "Form check", "version": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["order_index"], 2);

    let response = put_json_auth(
        app.clone(),
        &set_uri,
        &admin,
        serde_json::json!({ "set_number": 1, "reps": 6, "version": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["reps"], 6);

    let response = delete_auth(app.clone(), &set_uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app.clone(), &entry_uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &entry_uri, &alice).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
