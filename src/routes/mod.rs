pub mod health;
pub mod risk;

use axum::{routing::get, Router};

use risk::AppState;

/// Build the API router (without CORS, tracing or Swagger layers).
pub(crate) fn router(state: AppState) -> Router {
    let risk_routes = Router::new()
        .route("/risk", get(risk::get_risk))
        .with_state(state);

    Router::new()
        .route("/health", get(health::health_check))
        .merge(risk_routes)
}
