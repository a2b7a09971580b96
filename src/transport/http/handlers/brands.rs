use crate::domain::{Brand, BrandPayload, DomainError};
use crate::transport::http::error::{json_rejection, parse_id, query_rejection};
use crate::transport::http::types::{ApiResponse, AppState, BrandListParams};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/brands",
    tag = "brands",
    request_body = BrandPayload,
    responses(
        (status = 201, description = "Brand created, wrapped in { success, data }", body = Brand),
        (status = 400, description = "Invalid payload or duplicate name", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn create_brand_handler(
    State(state): State<AppState>,
    payload: Result<Json<BrandPayload>, JsonRejection>,
) -> Result<impl IntoResponse, DomainError> {
    let Json(payload) = payload.map_err(json_rejection)?;
    let brand = state.brands.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(brand))))
}

#[utoipa::path(
    get,
    path = "/api/brands",
    tag = "brands",
    params(BrandListParams),
    responses(
        (status = 200, description = "One page of brands with pagination metadata", body = [Brand]),
        (status = 400, description = "Invalid query parameters", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn list_brands_handler(
    State(state): State<AppState>,
    params: Result<Query<BrandListParams>, QueryRejection>,
) -> Result<impl IntoResponse, DomainError> {
    let Query(params) = params.map_err(query_rejection)?;
    let page = state.brands.list(params.into_query()?).await?;
    Ok(Json(ApiResponse::page(page)))
}

#[utoipa::path(
    get,
    path = "/api/brands/{id}",
    tag = "brands",
    params(("id" = i32, Path, description = "Brand id")),
    responses(
        (status = 200, description = "Brand found", body = Brand),
        (status = 400, description = "Malformed id", body = crate::transport::http::types::ErrorBody),
        (status = 404, description = "No such brand", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn get_brand_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    let brand = state.brands.get_by_id(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(brand)))
}

#[utoipa::path(
    put,
    path = "/api/brands/{id}",
    tag = "brands",
    params(("id" = i32, Path, description = "Brand id")),
    request_body = BrandPayload,
    responses(
        (status = 200, description = "Brand updated", body = Brand),
        (status = 400, description = "Invalid payload or duplicate name", body = crate::transport::http::types::ErrorBody),
        (status = 404, description = "No such brand", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn update_brand_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<BrandPayload>, JsonRejection>,
) -> Result<impl IntoResponse, DomainError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload.map_err(json_rejection)?;
    let brand = state.brands.update(id, payload).await?;
    Ok(Json(ApiResponse::ok(brand)))
}

#[utoipa::path(
    delete,
    path = "/api/brands/{id}",
    tag = "brands",
    params(("id" = i32, Path, description = "Brand id")),
    responses(
        (status = 200, description = "Brand and its models and cars deleted; data is null"),
        (status = 404, description = "No such brand", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn delete_brand_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    state.brands.delete(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::<Brand>::empty()))
}
