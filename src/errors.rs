use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Body returned when the geocoder has no match for the requested place.
pub const INVALID_LOCATION_MESSAGE: &str = "Invalid location";

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl ErrorResponse {
    pub fn invalid_location() -> Self {
        Self {
            error: INVALID_LOCATION_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("External service error: {0}")]
    FetchError(String),

    #[error("No data: {0}")]
    NoData(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::LocationNotFound(name) => {
                tracing::debug!("No geocoding match for '{}'", name);
                (StatusCode::NOT_FOUND, INVALID_LOCATION_MESSAGE.to_string())
            }
            AppError::FetchError(msg) => {
                tracing::warn!("Upstream fetch failed: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::NoData(msg) => {
                tracing::warn!("Upstream returned no data: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::LocationNotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::FetchError("x".into()), StatusCode::BAD_GATEWAY),
            (AppError::NoData("x".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::Validation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::InternalError("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_invalid_location_body() {
        let body = serde_json::to_value(ErrorResponse::invalid_location()).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Invalid location" }));
    }
}
