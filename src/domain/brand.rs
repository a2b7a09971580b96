use crate::domain::error::DomainResult;
use crate::domain::query::{PageRequest, SortOrder};
use crate::domain::validation::{validate_payload, validate_safe_text};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A vehicle manufacturer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: i32,
    pub name: String,
}

/// Body of `POST /api/brands` and `PUT /api/brands/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandPayload {
    #[validate(
        length(min = 2, max = 100, message = "must be between 2 and 100 characters"),
        custom = "validate_safe_text"
    )]
    #[schema(example = "Volkswagen")]
    pub name: String,
}

impl BrandPayload {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Trims and validates the payload.
    pub fn normalized(mut self) -> DomainResult<Self> {
        self.name = self.name.trim().to_string();
        validate_payload(&self)?;
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrandSortField {
    #[default]
    Id,
    Name,
}

impl BrandSortField {
    /// Unknown fields fall back to `id`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("name") => BrandSortField::Name,
            _ => BrandSortField::Id,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            BrandSortField::Id => "b.id",
            BrandSortField::Name => "LOWER(b.name)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrandListQuery {
    pub search: Option<String>,
    pub sort_by: BrandSortField,
    pub order: SortOrder,
    pub page: PageRequest,
}
