//! Wrappers around axum's extractors whose rejections render through
//! [`AppError`], so malformed bodies, paths, and query strings get the same
//! JSON error envelope as every other failure.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use repwise_core::error::{CoreError, FieldErrors};
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_path_to_error::Segment;

use crate::error::AppError;

/// JSON body extractor.
///
/// Syntax errors and a wrong content type are a plain 400. A body that parses
/// but does not fit `T` is reported per field: each mistyped field is
/// recorded under its path and dropped, and decoding is retried until it
/// succeeds or a required field is missing.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<Value>::from_request(req, state).await?;
        decode_body(value).map(AppJson)
    }
}

/// Decode `value` into `T`, collecting every field-level mismatch.
pub fn decode_body<T: DeserializeOwned>(mut value: Value) -> Result<T, AppError> {
    let mut errors = FieldErrors::new();

    loop {
        let err = match serde_path_to_error::deserialize::<_, T>(&value) {
            Ok(decoded) if errors.is_empty() => return Ok(decoded),
            Ok(_) => break,
            Err(err) => err,
        };

        let path = err.path().to_string();
        let detail = err.inner().to_string();

        if let Some(field) = missing_field(&detail) {
            let key = if path == "." {
                field.to_string()
            } else {
                format!("{path}.{field}")
            };
            errors.entry(key).or_insert_with(|| "Field is required".to_string());
            break;
        }

        let key = if path == "." { "body".to_string() } else { path };
        if errors.contains_key(&key) {
            break;
        }
        errors.insert(key, format!("Invalid value: {detail}"));

        if !remove_at(&mut value, err.path()) {
            break;
        }
    }

    Err(AppError::Core(CoreError::FieldValidation(errors)))
}

/// The field name out of serde's "missing field `name`" message.
fn missing_field(detail: &str) -> Option<&str> {
    detail
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
}

/// Remove the object member `path` points at. Returns false when the path
/// does not end in an object key.
fn remove_at(value: &mut Value, path: &serde_path_to_error::Path) -> bool {
    let segments: Vec<&Segment> = path.iter().collect();
    let Some((last, parents)) = segments.split_last() else {
        return false;
    };

    let mut cursor = value;
    for segment in parents {
        let next = match segment {
            Segment::Map { key } => cursor.get_mut(key.as_str()),
            Segment::Seq { index } => cursor.get_mut(*index),
            _ => None,
        };
        match next {
            Some(inner) => cursor = inner,
            None => return false,
        }
    }

    match last {
        Segment::Map { key } => cursor
            .as_object_mut()
            .is_some_and(|object| object.remove(key.as_str()).is_some()),
        _ => false,
    }
}

/// `axum::extract::Path` with an [`AppError`] rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// `axum::extract::Query` with an [`AppError`] rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
