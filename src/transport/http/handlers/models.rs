use crate::domain::{CarModel, CarModelPayload, DomainError};
use crate::transport::http::error::{json_rejection, parse_id, query_rejection};
use crate::transport::http::types::{ApiResponse, AppState, ModelListParams};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/models",
    tag = "models",
    request_body = CarModelPayload,
    responses(
        (status = 201, description = "Model created, brand embedded", body = CarModel),
        (status = 400, description = "Invalid payload, unknown brand or duplicate name", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn create_model_handler(
    State(state): State<AppState>,
    payload: Result<Json<CarModelPayload>, JsonRejection>,
) -> Result<impl IntoResponse, DomainError> {
    let Json(payload) = payload.map_err(json_rejection)?;
    let model = state.models.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(model))))
}

#[utoipa::path(
    get,
    path = "/api/models",
    tag = "models",
    params(ModelListParams),
    responses(
        (status = 200, description = "One page of models with pagination metadata", body = [CarModel]),
        (status = 400, description = "Invalid query parameters", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn list_models_handler(
    State(state): State<AppState>,
    params: Result<Query<ModelListParams>, QueryRejection>,
) -> Result<impl IntoResponse, DomainError> {
    let Query(params) = params.map_err(query_rejection)?;
    let page = state.models.list(params.into_query()?).await?;
    Ok(Json(ApiResponse::page(page)))
}

#[utoipa::path(
    get,
    path = "/api/models/{id}",
    tag = "models",
    params(("id" = i32, Path, description = "Model id")),
    responses(
        (status = 200, description = "Model found", body = CarModel),
        (status = 404, description = "No such model", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn get_model_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    let model = state.models.get_by_id(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(model)))
}

#[utoipa::path(
    put,
    path = "/api/models/{id}",
    tag = "models",
    params(("id" = i32, Path, description = "Model id")),
    request_body = CarModelPayload,
    responses(
        (status = 200, description = "Model updated", body = CarModel),
        (status = 400, description = "Invalid payload, unknown brand or duplicate name", body = crate::transport::http::types::ErrorBody),
        (status = 404, description = "No such model", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn update_model_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CarModelPayload>, JsonRejection>,
) -> Result<impl IntoResponse, DomainError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload.map_err(json_rejection)?;
    let model = state.models.update(id, payload).await?;
    Ok(Json(ApiResponse::ok(model)))
}

#[utoipa::path(
    delete,
    path = "/api/models/{id}",
    tag = "models",
    params(("id" = i32, Path, description = "Model id")),
    responses(
        (status = 200, description = "Model and its cars deleted; data is null"),
        (status = 404, description = "No such model", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn delete_model_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    state.models.delete(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::<CarModel>::empty()))
}
