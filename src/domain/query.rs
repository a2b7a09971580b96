//! Sorting and pagination primitives shared by every list query.

use crate::domain::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MAX_PAGE_LIMIT: u32 = 100;
pub const DEFAULT_BRAND_LIMIT: u32 = 10;
pub const DEFAULT_MODEL_LIMIT: u32 = 10;
pub const DEFAULT_CAR_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parses `asc`/`desc` (any case). Absent means ascending.
    pub fn parse(raw: Option<&str>) -> DomainResult<Self> {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("asc") => Ok(SortOrder::Asc),
            Some("desc") => Ok(SortOrder::Desc),
            Some(other) => Err(DomainError::validation(format!(
                "order: expected 'asc' or 'desc', got '{}'",
                other
            ))),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A validated `page`/`limit` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: u32) -> DomainResult<Self> {
        let page = page.unwrap_or(1);
        if page < 1 || page > i64::from(u32::MAX) {
            return Err(DomainError::validation("page: must be at least 1"));
        }
        let limit = limit.unwrap_or(i64::from(default_limit));
        if !(1..=i64::from(MAX_PAGE_LIMIT)).contains(&limit) {
            return Err(DomainError::validation(format!(
                "limit: must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }
        Ok(Self {
            page: page as u32,
            limit: limit as u32,
        })
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

/// Pagination metadata returned alongside list data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let limit = u64::from(request.limit.max(1));
        let total_pages = total.div_ceil(limit);
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
            has_next: u64::from(request.page) < total_pages,
            has_prev: request.page > 1,
        }
    }
}

/// One page of a list query.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            pagination: Pagination::new(request, total),
        }
    }
}

/// Escapes `%`, `_` and `\` so user text matches literally inside `ILIKE`.
pub fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Case-insensitive substring test with the same meaning as `ILIKE '%needle%'`.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
