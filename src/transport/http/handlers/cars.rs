use crate::domain::{Car, CarPayload, DomainError};
use crate::transport::http::error::{json_rejection, parse_id, query_rejection};
use crate::transport::http::types::{ApiResponse, AppState, CarListParams};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/cars",
    tag = "cars",
    request_body = CarPayload,
    responses(
        (status = 201, description = "Car created, model and brand embedded", body = Car),
        (status = 400, description = "Invalid payload or unknown model", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn create_car_handler(
    State(state): State<AppState>,
    payload: Result<Json<CarPayload>, JsonRejection>,
) -> Result<impl IntoResponse, DomainError> {
    let Json(payload) = payload.map_err(json_rejection)?;
    let car = state.cars.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(car))))
}

/// Filters are ANDed together; text filters are case-insensitive substrings.
#[utoipa::path(
    get,
    path = "/api/cars",
    tag = "cars",
    params(CarListParams),
    responses(
        (status = 200, description = "Matching cars with pagination metadata", body = [Car]),
        (status = 400, description = "Invalid filter, sort order or paging values", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn list_cars_handler(
    State(state): State<AppState>,
    params: Result<Query<CarListParams>, QueryRejection>,
) -> Result<impl IntoResponse, DomainError> {
    let Query(params) = params.map_err(query_rejection)?;
    let page = state.cars.list(params.into_query()?).await?;
    Ok(Json(ApiResponse::page(page)))
}

#[utoipa::path(
    get,
    path = "/api/cars/{id}",
    tag = "cars",
    params(("id" = i32, Path, description = "Car id")),
    responses(
        (status = 200, description = "Car found", body = Car),
        (status = 404, description = "No such car", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn get_car_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    let car = state.cars.get_by_id(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(car)))
}

#[utoipa::path(
    put,
    path = "/api/cars/{id}",
    tag = "cars",
    params(("id" = i32, Path, description = "Car id")),
    request_body = CarPayload,
    responses(
        (status = 200, description = "Car updated", body = Car),
        (status = 400, description = "Invalid payload or unknown model", body = crate::transport::http::types::ErrorBody),
        (status = 404, description = "No such car", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn update_car_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CarPayload>, JsonRejection>,
) -> Result<impl IntoResponse, DomainError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload.map_err(json_rejection)?;
    let car = state.cars.update(id, payload).await?;
    Ok(Json(ApiResponse::ok(car)))
}

#[utoipa::path(
    delete,
    path = "/api/cars/{id}",
    tag = "cars",
    params(("id" = i32, Path, description = "Car id")),
    responses(
        (status = 200, description = "Car deleted; data is null"),
        (status = 404, description = "No such car", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn delete_car_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    state.cars.delete(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::<Car>::empty()))
}
