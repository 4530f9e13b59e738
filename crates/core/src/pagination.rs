//! Page/size arithmetic shared by every paginated listing.

use serde::Serialize;

use crate::error::CoreError;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp a user-provided page size to `1..=max`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided page index to non-negative.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(0).max(0)
}

/// A zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        Self {
            page: clamp_page(page),
            size: clamp_limit(size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A single-column ordering parsed from `field` or `field,asc|desc`.
///
/// The field is only checked against an allow-list by [`Sort::parse`]; it is
/// interpolated into SQL so it must never bypass that check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    field: &'static str,
    direction: SortDirection,
}

impl Sort {
    /// Parse `raw` against `allowed`. Direction defaults to ascending.
    pub fn parse(raw: &str, allowed: &[&'static str]) -> Result<Self, CoreError> {
        let mut parts = raw.splitn(2, ',');
        let name = parts.next().unwrap_or_default().trim();
        let direction = match parts.next().map(|d| d.trim().to_ascii_lowercase()) {
            None => SortDirection::Asc,
            Some(d) if d == "asc" => SortDirection::Asc,
            Some(d) if d == "desc" => SortDirection::Desc,
            Some(d) => {
                return Err(CoreError::field(
                    "sort",
                    format!("Invalid sort direction '{d}'. Must be asc or desc"),
                ))
            }
        };
        let field = allowed
            .iter()
            .copied()
            .find(|f| *f == name)
            .ok_or_else(|| {
                CoreError::field(
                    "sort",
                    format!(
                        "Cannot sort by '{name}'. Sortable fields: {}",
                        allowed.join(", ")
                    ),
                )
            })?;
        Ok(Self { field, direction })
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// `ORDER BY` body, with `id` as a stable tiebreaker.
    pub fn to_sql(&self) -> String {
        if self.field == "id" {
            format!("id {}", self.direction.as_sql())
        } else {
            format!("{} {}, id ASC", self.field, self.direction.as_sql())
        }
    }
}

/// One page of results plus totals computed with the same filter.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        let total_pages = if total_elements == 0 {
            0
        } else {
            (total_elements + request.size - 1) / request.size
        };
        Self {
            items,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
        }
    }

    pub fn map<U: Serialize>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
