//! Shared query parameter types for API handlers.
//!
//! Query strings are flat (`serde_urlencoded` cannot flatten typed fields),
//! so every listing struct repeats `page` / `size` / `sort` and exposes them
//! through [`Paged`].

use std::str::FromStr;

use repwise_core::error::CoreError;
use repwise_core::pagination::{PageRequest, Sort};
use repwise_core::status::{ExerciseType, WorkoutStatus};
use repwise_db::models::exercise::ExerciseFilter;
use serde::Deserialize;

/// Access to the paging fields of a query struct.
pub trait Paged {
    fn page(&self) -> Option<i64>;
    fn size(&self) -> Option<i64>;
    fn sort_param(&self) -> Option<&str>;

    /// Page index and size, clamped to the allowed ranges.
    fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page(), self.size())
    }

    /// `?sort=field[,asc|desc]` checked against `allowed`.
    fn sort(&self, allowed: &[&'static str]) -> Result<Option<Sort>, CoreError> {
        match self.sort_param().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Sort::parse(raw, allowed).map(Some),
            None => Ok(None),
        }
    }
}

macro_rules! impl_paged {
    ($($ty:ty),+) => {
        $(impl Paged for $ty {
            fn page(&self) -> Option<i64> {
                self.page
            }
            fn size(&self) -> Option<i64> {
                self.size
            }
            fn sort_param(&self) -> Option<&str> {
                self.sort.as_deref()
            }
        })+
    };
}

/// Generic pagination parameters (`?page=&size=&sort=`).
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
}

/// `GET /workouts` parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutListParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
    /// Status label, e.g. `IN_PROGRESS`.
    pub status: Option<String>,
    /// Admin only.
    #[serde(default)]
    pub include_deleted: bool,
}

impl WorkoutListParams {
    pub fn status(&self) -> Result<Option<WorkoutStatus>, CoreError> {
        parse_label(self.status.as_deref(), "status")
    }
}

/// `GET /exercises` parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseListParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
    #[serde(rename = "type")]
    pub exercise_type: Option<String>,
    pub muscle_group: Option<String>,
    pub difficulty: Option<String>,
    pub name: Option<String>,
}

impl ExerciseListParams {
    pub fn filter(&self) -> Result<ExerciseFilter, CoreError> {
        Ok(ExerciseFilter {
            exercise_type: parse_label::<ExerciseType>(self.exercise_type.as_deref(), "type")?,
            muscle_group: non_empty(&self.muscle_group).map(str::to_ascii_uppercase),
            difficulty: non_empty(&self.difficulty).map(str::to_ascii_uppercase),
            name: non_empty(&self.name).map(str::to_string),
        })
    }
}

impl_paged!(PageParams, WorkoutListParams, ExerciseListParams);

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_label<T>(raw: Option<&str>, field: &str) -> Result<Option<T>, CoreError>
where
    T: FromStr<Err = String>,
{
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map(Some).map_err(|e| CoreError::field(field, e)),
        None => Ok(None),
    }
}
