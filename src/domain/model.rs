use crate::domain::brand::Brand;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::query::{PageRequest, SortOrder};
use crate::domain::validation::{validate_payload, validate_safe_text};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A vehicle model, owned by a brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarModel {
    pub id: i32,
    pub name: String,
    pub brand_id: i32,
    /// Reference market value (FIPE table).
    pub fipe_value: f64,
    /// Eager-loaded owning brand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<Brand>,
}

/// Body of `POST /api/models` and `PUT /api/models/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarModelPayload {
    #[validate(
        length(min = 2, max = 100, message = "must be between 2 and 100 characters"),
        custom = "validate_safe_text"
    )]
    #[schema(example = "Gol")]
    pub name: String,
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub brand_id: i32,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    #[schema(example = 45000.0)]
    pub fipe_value: f64,
}

impl CarModelPayload {
    pub fn new(name: impl Into<String>, brand_id: i32, fipe_value: f64) -> Self {
        Self {
            name: name.into(),
            brand_id,
            fipe_value,
        }
    }

    pub fn normalized(mut self) -> DomainResult<Self> {
        self.name = self.name.trim().to_string();
        validate_payload(&self)?;
        if !self.fipe_value.is_finite() {
            return Err(DomainError::validation("fipeValue: must be a finite number"));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelSortField {
    #[default]
    Id,
    Name,
    FipeValue,
}

impl ModelSortField {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("name") => ModelSortField::Name,
            Some("fipeValue") => ModelSortField::FipeValue,
            _ => ModelSortField::Id,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            ModelSortField::Id => "m.id",
            ModelSortField::Name => "LOWER(m.name)",
            ModelSortField::FipeValue => "m.fipe_value",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelListQuery {
    pub search: Option<String>,
    pub brand_id: Option<i32>,
    pub sort_by: ModelSortField,
    pub order: SortOrder,
    pub page: PageRequest,
}
