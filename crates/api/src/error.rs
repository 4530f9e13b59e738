use std::collections::BTreeMap;

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use repwise_core::error::CoreError;
use serde::Serialize;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Every variant renders the same JSON envelope:
///
/// ```json
/// { "message": "...", "status": 400, "code": "VALIDATION_ERROR", "errors": { "field": "msg" } }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `repwise_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// The error body shared by every failure response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub status: u16,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

const GENERIC_MESSAGE: &str = "An unexpected error occurred";

struct Classified {
    status: StatusCode,
    code: &'static str,
    message: String,
    errors: Option<BTreeMap<String, String>>,
}

impl Classified {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            errors: None,
        }
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", GENERIC_MESSAGE)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut retry_headers = None;

        let classified = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => Classified::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    Classified::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::FieldValidation(fields) => Classified {
                    errors: Some(fields.clone()),
                    ..Classified::new(
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        "Validation failed",
                    )
                },
                CoreError::Conflict(msg) => {
                    Classified::new(StatusCode::CONFLICT, "CONFLICT", msg.clone())
                }
                CoreError::OptimisticLock {
                    entity,
                    id,
                    expected_version,
                    current_version,
                } => {
                    let mut details = BTreeMap::new();
                    details.insert("entityType".to_string(), entity.to_string());
                    details.insert("id".to_string(), id.to_string());
                    details.insert("expectedVersion".to_string(), expected_version.to_string());
                    details.insert("currentVersion".to_string(), current_version.to_string());
                    Classified {
                        errors: Some(details),
                        ..Classified::new(
                            StatusCode::CONFLICT,
                            "OPTIMISTIC_LOCK",
                            format!(
                                "{entity} was modified by another request. Reload it and try again"
                            ),
                        )
                    }
                }
                CoreError::Unauthorized(msg) => {
                    Classified::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => {
                    Classified::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone())
                }
                CoreError::RateLimited {
                    retry_after_secs,
                    reset_at,
                } => {
                    retry_headers = Some((*retry_after_secs, reset_at.timestamp()));
                    Classified::new(
                        StatusCode::TOO_MANY_REQUESTS,
                        "RATE_LIMITED",
                        format!("Too many requests. Retry after {retry_after_secs} seconds"),
                    )
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    Classified::internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                Classified::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                Classified::internal()
            }
        };

        let body = ErrorBody {
            message: classified.message,
            status: classified.status.as_u16(),
            code: classified.code,
            errors: classified.errors,
        };
        let mut response = (classified.status, axum::Json(body)).into_response();

        if let Some((retry_after, reset)) = retry_headers {
            let headers = response.headers_mut();
            headers.insert("Retry-After", HeaderValue::from(retry_after));
            headers.insert("X-RateLimit-Reset", HeaderValue::from(reset));
        }

        response
    }
}

/// Classify a sqlx error.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations (`23505`) on a `uq_` constraint map to 409.
/// - Foreign-key violations (`23503`) map to 409.
/// - Check violations (`23514`) on a `ck_` constraint map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> Classified {
    match err {
        sqlx::Error::RowNotFound => {
            Classified::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found")
        }
        sqlx::Error::Database(db_err) => {
            match db_err.code().as_deref() {
                Some("23505") => {
                    let constraint = db_err.constraint().unwrap_or("unknown");
                    if constraint.starts_with("uq_") {
                        return Classified::new(
                            StatusCode::CONFLICT,
                            "CONFLICT",
                            format!("Duplicate value violates unique constraint: {constraint}"),
                        );
                    }
                }
                Some("23503") => {
                    return Classified::new(
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        "The resource is still referenced by other records",
                    );
                }
                Some("23514") => {
                    let constraint = db_err.constraint().unwrap_or("unknown");
                    if constraint.starts_with("ck_") {
                        return Classified::new(
                            StatusCode::BAD_REQUEST,
                            "VALIDATION_ERROR",
                            format!("Value violates check constraint: {constraint}"),
                        );
                    }
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            Classified::internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            Classified::internal()
        }
    }
}
