//! Maps domain failures and extractor rejections onto the JSON error envelope.

use crate::domain::{DomainError, DomainResult};
use crate::transport::http::types::ErrorBody;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::any::Any;
use tracing::{error, warn};

pub fn status_of(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) | DomainError::Conflict(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = status_of(&self);
        let message = match &self {
            DomainError::Internal(detail) => {
                error!("internal error: {}", detail);
                "Internal server error".to_string()
            }
            other => {
                warn!(kind = other.kind(), "request rejected: {}", other);
                other.to_string()
            }
        };
        let body = ErrorBody {
            message,
            status_code: status.as_u16(),
            error: Some(self.kind().to_string()),
        };
        (status, Json(body)).into_response()
    }
}

pub fn json_rejection(rejection: JsonRejection) -> DomainError {
    DomainError::validation(format!("invalid JSON body: {}", rejection.body_text()))
}

pub fn query_rejection(rejection: QueryRejection) -> DomainError {
    DomainError::validation(format!("invalid query string: {}", rejection.body_text()))
}

/// Path ids must be positive 32-bit integers.
pub fn parse_id(raw: &str) -> DomainResult<i32> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(DomainError::validation(format!(
            "id: must be a positive integer, got '{}'",
            raw
        ))),
    }
}

pub async fn fallback(uri: Uri) -> Response {
    DomainError::NotFound(format!("Route {} not found", uri.path())).into_response()
}

/// Used by `CatchPanicLayer::custom`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    DomainError::internal(format!("handler panicked: {}", detail)).into_response()
}
