use crate::transport::http::types::HealthResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "health",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse)
    )
)]
pub async fn healthcheck_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        healthcheck: "server is alive".to_string(),
    })
}
