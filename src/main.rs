// Weather Buddy API v0.1
use axum::http::HeaderValue;
use std::net::SocketAddr;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod helpers;
mod routes;
mod services;

use config::{AppConfig, LogFormat};
use routes::risk::AppState;

/// Weather Buddy API — OpenAPI specification.
///
/// Title and version are overridden from `AppConfig` at startup.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather Buddy API",
        version = "1.0",
        description = "Geocodes a place name, fetches its hourly forecast for one day \
            from Open-Meteo, and classifies the daily means into risk labels \
            (Very Hot, Very Cold, Very Windy, Very Wet, Very Uncomfortable).",
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Risk", description = "Weather risk classification"),
    ),
    paths(
        routes::health::health_check,
        routes::risk::get_risk,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            services::risk::RiskReport,
            services::risk::Metrics,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "weather_buddy_api=debug,tower_http=debug".into());

    let (plain, json) = match format {
        LogFormat::Plain => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .init();
}

/// CORS policy from config.
///
/// `*` mirrors the request origin so credentials can stay allowed; a wildcard
/// origin together with credentials is rejected by browsers.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origin = if config.cors_allows_any_origin() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

fn openapi_doc(config: &AppConfig) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = config.api_title.clone();
    doc.info.version = config.api_version.clone();
    doc
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);

    let state = AppState::new(&config).expect("Failed to create Open-Meteo client");

    let app = routes::router(state)
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi_doc(&config)),
        )
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Geocoding via {}, forecasts via {} (timeout {:?})",
        config.geocoding_url,
        config.forecast_url,
        config.request_timeout
    );
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
