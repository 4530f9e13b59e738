//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly; no server is involved. The
//! constraint cases provoke real PostgreSQL errors to classify.

use axum::response::IntoResponse;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use repwise_api::error::AppError;
use repwise_core::error::{CoreError, FieldErrors};

/// Helper: convert an `AppError` into its status code, headers, and JSON body.
async fn error_to_response(
    err: AppError,
) -> (axum::http::StatusCode, axum::http::HeaderMap, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, headers, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "WorkoutSession",
        id: 42,
    });

    let (status, _, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["status"], 404);
    assert_eq!(json["message"], "WorkoutSession with id 42 not found");
    assert!(json.get("errors").is_none());
}

#[tokio::test]
async fn field_validation_lists_every_field() {
    let mut fields = FieldErrors::new();
    fields.insert("reps".into(), "Reps must be between 1 and 1000".into());
    fields.insert("set_number".into(), "Set number must be between 1 and 50".into());

    let (status, _, json) = error_to_response(AppError::Core(CoreError::FieldValidation(fields))).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["errors"]["reps"], "Reps must be between 1 and 1000");
    assert_eq!(json["errors"]["set_number"], "Set number must be between 1 and 50");
}

#[tokio::test]
async fn optimistic_lock_carries_versions() {
    let err = AppError::Core(CoreError::OptimisticLock {
        entity: "StrengthSet",
        id: 9,
        expected_version: 2,
        current_version: 3,
    });

    let (status, _, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::CONFLICT);
    assert_eq!(json["code"], "OPTIMISTIC_LOCK");
    assert_eq!(json["errors"]["entityType"], "StrengthSet");
    assert_eq!(json["errors"]["id"], "9");
    assert_eq!(json["errors"]["expectedVersion"], "2");
    assert_eq!(json["errors"]["currentVersion"], "3");
}

#[tokio::test]
async fn rate_limited_sets_retry_headers() {
    let reset_at = Utc.with_ymd_and_hms(2026, 6, 15, 18, 0, 7).unwrap();
    let err = AppError::Core(CoreError::RateLimited {
        retry_after_secs: 7,
        reset_at,
    });

    let (status, headers, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["code"], "RATE_LIMITED");
    assert_eq!(headers["retry-after"], "7");
    assert_eq!(headers["x-ratelimit-reset"], reset_at.timestamp().to_string().as_str());
}

#[tokio::test]
async fn auth_errors_map_to_401_and_403() {
    let (status, _, json) =
        error_to_response(AppError::Core(CoreError::Unauthorized("no token".into()))).await;
    assert_eq!(status, axum::http::StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let (status, _, json) =
        error_to_response(AppError::Core(CoreError::Forbidden("not yours".into()))).await;
    assert_eq!(status, axum::http::StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "not yours");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let (status, _, json) = error_to_response(AppError::BadRequest("malformed JSON".into())).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["message"], "malformed JSON");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret database credentials leaked".into());

    let (status, _, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["message"], "An unexpected error occurred");
    assert!(!json.to_string().contains("credentials"));
}

#[tokio::test]
async fn row_not_found_maps_to_404() {
    let (status, _, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;
    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn check_violation_maps_to_400(pool: sqlx::PgPool) {
    let err = sqlx::query(
        "INSERT INTO users (subject, email, username, deleted, deleted_at)
         VALUES ('auth0|odd', 'odd@example.com', 'odd', true, NULL)",
    )
    .execute(&pool)
    .await
    .unwrap_err();

    let (status, _, json) = error_to_response(AppError::Database(err)).await;
    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["message"].as_str().unwrap().contains("ck_users_deleted_at"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unique_violation_maps_to_409(pool: sqlx::PgPool) {
    let insert = "INSERT INTO users (subject, email, username) VALUES ($1, $2, $3)";
    sqlx::query(insert)
        .bind("auth0|one")
        .bind("one@example.com")
        .bind("Twin")
        .execute(&pool)
        .await
        .unwrap();
    let err = sqlx::query(insert)
        .bind("auth0|two")
        .bind("two@example.com")
        .bind("twin")
        .execute(&pool)
        .await
        .unwrap_err();

    let (status, _, json) = error_to_response(AppError::Database(err)).await;
    assert_eq!(status, axum::http::StatusCode::CONFLICT);
    assert!(json["message"].as_str().unwrap().contains("uq_users_username_lower"));
}
