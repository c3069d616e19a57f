//! Maps domain errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use shelf_core::ShelfError;
use tracing::{error, warn};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(&'static str),
    Domain(ShelfError),
}

impl From<ShelfError> for ApiError {
    fn from(err: ShelfError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.to_string())
            }
            ApiError::Domain(err) => match err {
                ShelfError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
                ShelfError::InvalidArgument(msg) => {
                    warn!(error = %msg, "Request validation failed");
                    metrics::counter!("api.validation_errors").increment(1);
                    (StatusCode::BAD_REQUEST, "invalid_argument", msg)
                }
                ShelfError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
                other => {
                    error!(error = %other, "Request failed");
                    metrics::counter!("api.errors").increment(1);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal",
                        "Internal processing error".to_string(),
                    )
                }
            },
        };

        (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
