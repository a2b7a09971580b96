use crate::app::{BrandService, CarService, ModelService};
use crate::domain::query::{DEFAULT_BRAND_LIMIT, DEFAULT_CAR_LIMIT, DEFAULT_MODEL_LIMIT};
use crate::domain::validation::check_filter_text;
use crate::domain::{
    BrandListQuery, BrandSortField, CarFilters, CarListQuery, CarSortField, DomainError,
    DomainResult, ModelListQuery, ModelSortField, Page, PageRequest, Pagination, SortOrder,
};
use crate::storage::Repositories;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub brands: Arc<BrandService>,
    pub models: Arc<ModelService>,
    pub cars: Arc<CarService>,
}

impl AppState {
    pub fn new(repos: Repositories) -> Self {
        Self {
            brands: Arc::new(BrandService::new(repos.brands.clone())),
            models: Arc::new(ModelService::new(repos.models.clone(), repos.brands)),
            cars: Arc::new(CarService::new(repos.cars, repos.models)),
        }
    }
}

/// Success envelope: `{ success, data, pagination? }`.
#[derive(Serialize, Debug)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: None,
        }
    }

    /// `data: null`, as returned by deletes.
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            pagination: None,
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn page(page: Page<T>) -> Self {
        Self {
            success: true,
            data: Some(page.items),
            pagination: Some(page.pagination),
        }
    }
}

/// Error envelope: `{ message, statusCode, error }`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: String,
    pub status_code: u16,
    /// Error kind, e.g. `ValidationError`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub healthcheck: String,
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BrandListParams {
    /// Page number, starting at 1.
    pub page: Option<i64>,
    /// Page size (1-100, default 10).
    pub limit: Option<i64>,
    /// Case-insensitive substring of the brand name.
    pub search: Option<String>,
    /// `id` (default) or `name`.
    pub sort_by: Option<String>,
    /// `asc` (default) or `desc`.
    pub sort_order: Option<String>,
}

impl BrandListParams {
    pub fn into_query(self) -> DomainResult<BrandListQuery> {
        Ok(BrandListQuery {
            search: check_filter_text("search", self.search)?,
            sort_by: BrandSortField::parse(self.sort_by.as_deref()),
            order: SortOrder::parse(self.sort_order.as_deref())?,
            page: PageRequest::new(self.page, self.limit, DEFAULT_BRAND_LIMIT)?,
        })
    }
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ModelListParams {
    pub page: Option<i64>,
    /// Page size (1-100, default 10).
    pub limit: Option<i64>,
    /// Case-insensitive substring of the model name.
    pub search: Option<String>,
    pub brand_id: Option<i32>,
    /// `id` (default), `name` or `fipeValue`.
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ModelListParams {
    pub fn into_query(self) -> DomainResult<ModelListQuery> {
        Ok(ModelListQuery {
            search: check_filter_text("search", self.search)?,
            brand_id: positive_id("brandId", self.brand_id)?,
            sort_by: ModelSortField::parse(self.sort_by.as_deref()),
            order: SortOrder::parse(self.sort_order.as_deref())?,
            page: PageRequest::new(self.page, self.limit, DEFAULT_MODEL_LIMIT)?,
        })
    }
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CarListParams {
    /// Exact model year.
    pub year: Option<i32>,
    pub year_gte: Option<i32>,
    pub year_lte: Option<i32>,
    pub value_gte: Option<f64>,
    pub value_lte: Option<f64>,
    pub number_of_ports: Option<i32>,
    /// Case-insensitive substring.
    pub color: Option<String>,
    /// Case-insensitive substring.
    pub fuel: Option<String>,
    /// Case-insensitive substring of the owning brand's name.
    pub brand_name: Option<String>,
    pub model_id: Option<i32>,
    /// `id` (default), `year`, `color`, `fuel`, `numberOfPorts` or `value`.
    pub sort_by: Option<String>,
    /// `asc` (default) or `desc`.
    pub order: Option<String>,
    /// Alias of `order`.
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    /// Page size (1-100, default 50).
    pub limit: Option<i64>,
}

impl CarListParams {
    pub fn into_query(self) -> DomainResult<CarListQuery> {
        let filters = CarFilters {
            year: self.year,
            year_gte: self.year_gte,
            year_lte: self.year_lte,
            value_gte: finite("valueGte", self.value_gte)?,
            value_lte: finite("valueLte", self.value_lte)?,
            number_of_ports: self.number_of_ports,
            color: check_filter_text("color", self.color)?,
            fuel: check_filter_text("fuel", self.fuel)?,
            brand_name: check_filter_text("brandName", self.brand_name)?,
            model_id: positive_id("modelId", self.model_id)?,
        };
        let order = self
            .order
            .filter(|o| !o.trim().is_empty())
            .or(self.sort_order);
        Ok(CarListQuery {
            filters,
            sort_by: CarSortField::parse(self.sort_by.as_deref()),
            order: SortOrder::parse(order.as_deref())?,
            page: PageRequest::new(self.page, self.limit, DEFAULT_CAR_LIMIT)?,
        })
    }
}

fn positive_id(field: &str, id: Option<i32>) -> DomainResult<Option<i32>> {
    match id {
        Some(id) if id < 1 => Err(DomainError::validation(format!(
            "{}: must be a positive integer",
            field
        ))),
        other => Ok(other),
    }
}

fn finite(field: &str, value: Option<f64>) -> DomainResult<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() => Err(DomainError::validation(format!(
            "{}: must be a finite number",
            field
        ))),
        other => Ok(other),
    }
}
