use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Fixed status string returned by the health endpoint.
pub const HEALTH_STATUS: &str = "Backend running fine";

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "Backend running fine"
    pub status: String,
}

/// Health check endpoint.
///
/// Always succeeds; it does not probe the upstream weather services.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse),
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTH_STATUS.to_string(),
    })
}
