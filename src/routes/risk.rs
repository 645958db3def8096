//! Risk HTTP endpoint.
//!
//! - GET /risk?location=<name>&date=<YYYY-MM-DD>&time=<HH:MM>

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::config::AppConfig;
use crate::errors::{AppError, ErrorResponse};
use crate::services::locator;
use crate::services::open_meteo::OpenMeteoClient;
use crate::services::risk::{self, RiskReport};

/// Shared application state for the risk endpoint.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) client: OpenMeteoClient,
    pub(crate) invalid_location_status: StatusCode,
}

impl AppState {
    pub(crate) fn new(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            client: OpenMeteoClient::new(config)?,
            invalid_location_status: config.invalid_location_status,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RiskQuery {
    /// City or place name (e.g. "new york")
    pub location: String,
    /// Date in YYYY-MM-DD, echoed back in the report
    pub date: String,
    /// Time in HH:MM (24h), echoed back in the report
    pub time: String,
}

/// Get risk labels for a location.
///
/// Geocodes the location, fetches one forecast day of hourly temperature,
/// wind speed and precipitation, and classifies the daily means into
/// Very Hot, Very Cold, Very Windy, Very Wet and Very Uncomfortable.
/// `date` and `time` are echoed back and do not select the forecast hours.
#[utoipa::path(
    get,
    path = "/risk",
    tag = "Risk",
    params(RiskQuery),
    responses(
        (status = 200, description = "Risk report, or {\"error\": \"Invalid location\"} when the place is unknown", body = RiskReport),
        (status = 404, description = "Unknown location (when INVALID_LOCATION_STATUS=404)", body = ErrorResponse),
        (status = 422, description = "Missing or blank query parameter", body = ErrorResponse),
        (status = 502, description = "Weather service unreachable or returned no data", body = ErrorResponse),
    )
)]
pub async fn get_risk(
    State(state): State<AppState>,
    query: Result<Query<RiskQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(params) = query.map_err(|e| AppError::Validation(e.body_text()))?;

    let location = params.location.trim();
    if location.is_empty() {
        return Err(AppError::Validation("location must not be empty".to_string()));
    }

    tracing::info!(
        "Evaluating risk for '{}' on {} at {}",
        location,
        params.date,
        params.time
    );

    let coords = match locator::resolve(&state.client, location).await {
        Ok(coords) => coords,
        Err(AppError::LocationNotFound(name)) => {
            tracing::info!("No geocoding match for '{}'", name);
            return Ok((
                state.invalid_location_status,
                Json(ErrorResponse::invalid_location()),
            )
                .into_response());
        }
        Err(e) => return Err(e),
    };

    let report = risk::evaluate(
        &state.client,
        coords,
        &params.date,
        &params.time,
        location,
    )
    .await?;

    Ok(Json(report).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::router;
    use std::time::Duration;
    use wiremock::matchers::{path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Serve the router on an ephemeral port, with both upstreams pointed at `upstream`.
    async fn spawn_app(upstream: &MockServer, invalid_location_status: StatusCode) -> String {
        let config = AppConfig {
            geocoding_url: upstream.uri(),
            forecast_url: upstream.uri(),
            request_timeout: Duration::from_secs(2),
            invalid_location_status,
            ..AppConfig::default()
        };
        let app = router(AppState::new(&config).unwrap());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn mount_geocoding(server: &MockServer, results: serde_json::Value) {
        Mock::given(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": results })),
            )
            .mount(server)
            .await;
    }

    async fn mount_forecast(server: &MockServer, temp: &[f64], wind: &[f64], rain: &[f64]) {
        Mock::given(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hourly": {
                    "temperature_2m": temp,
                    "wind_speed_10m": wind,
                    "precipitation": rain
                }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_risk_happy_path() {
        let upstream = MockServer::start().await;
        Mock::given(path("/v1/search"))
            .and(query_param("name", "seville"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{ "latitude": 37.38283, "longitude": -5.97317 }]
            })))
            .expect(1)
            .mount(&upstream)
            .await;
        Mock::given(path("/v1/forecast"))
            .and(query_param("latitude", "37.38283"))
            .and(query_param("longitude", "-5.97317"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hourly": {
                    "temperature_2m": [36.0, 37.0, 38.0],
                    "wind_speed_10m": [10.0, 12.0, 11.0],
                    "precipitation": [0.0, 0.0, 0.0]
                }
            })))
            .expect(1)
            .mount(&upstream)
            .await;
        let base = spawn_app(&upstream, StatusCode::OK).await;

        let resp = reqwest::get(format!(
            "{}/risk?location=seville&date=2026-07-01&time=14:00",
            base
        ))
        .await
        .unwrap();
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "location": "Seville",
                "date": "2026-07-01",
                "time": "14:00",
                "summary": ["Very Hot", "Very Uncomfortable"],
                "metrics": {
                    "avg_temp": "37.0 °C",
                    "avg_wind": "11.0 km/h",
                    "avg_rain": "0.0 mm"
                },
                "very_hot": true,
                "very_cold": false,
                "very_windy": false,
                "very_wet": false,
                "very_uncomfortable": true
            })
        );
    }

    #[tokio::test]
    async fn test_risk_comfortable_day() {
        let upstream = MockServer::start().await;
        mount_geocoding(
            &upstream,
            serde_json::json!([{ "latitude": 40.71427, "longitude": -74.00597 }]),
        )
        .await;
        mount_forecast(&upstream, &[20.0, 21.0, 22.0], &[5.0, 6.0, 7.0], &[0.0, 0.0, 0.0]).await;
        let base = spawn_app(&upstream, StatusCode::OK).await;

        let body: serde_json::Value = reqwest::get(format!(
            "{}/risk?location=new%20york&date=2026-05-10&time=09:30",
            base
        ))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

        assert_eq!(body["location"], "New York");
        assert_eq!(body["summary"], serde_json::json!(["Looks comfortable!"]));
        assert_eq!(body["very_uncomfortable"], false);
    }

    #[tokio::test]
    async fn test_risk_invalid_location_default_status() {
        let upstream = MockServer::start().await;
        mount_geocoding(&upstream, serde_json::json!([])).await;
        let base = spawn_app(&upstream, StatusCode::OK).await;

        let resp = reqwest::get(format!(
            "{}/risk?location=xyzzy&date=2026-05-10&time=09:30",
            base
        ))
        .await
        .unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Invalid location" }));
    }

    #[tokio::test]
    async fn test_risk_invalid_location_configured_status() {
        let upstream = MockServer::start().await;
        mount_geocoding(&upstream, serde_json::json!([])).await;
        let base = spawn_app(&upstream, StatusCode::NOT_FOUND).await;

        let resp = reqwest::get(format!(
            "{}/risk?location=xyzzy&date=2026-05-10&time=09:30",
            base
        ))
        .await
        .unwrap();
        assert_eq!(resp.status(), 404);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Invalid location" }));
    }

    #[tokio::test]
    async fn test_risk_missing_parameter() {
        let upstream = MockServer::start().await;
        let base = spawn_app(&upstream, StatusCode::OK).await;

        for query in [
            "date=2026-05-10&time=09:30",
            "location=bern&time=09:30",
            "location=bern&date=2026-05-10",
        ] {
            let resp = reqwest::get(format!("{}/risk?{}", base, query))
                .await
                .unwrap();
            assert_eq!(resp.status(), 422, "query: {}", query);
            let body: serde_json::Value = resp.json().await.unwrap();
            assert!(body["error"].is_string(), "query: {}", query);
        }
    }

    #[tokio::test]
    async fn test_risk_blank_location() {
        let upstream = MockServer::start().await;
        let base = spawn_app(&upstream, StatusCode::OK).await;

        let resp = reqwest::get(format!(
            "{}/risk?location=%20%20&date=2026-05-10&time=09:30",
            base
        ))
        .await
        .unwrap();
        assert_eq!(resp.status(), 422);
    }

    #[tokio::test]
    async fn test_risk_empty_series_is_bad_gateway() {
        let upstream = MockServer::start().await;
        mount_geocoding(
            &upstream,
            serde_json::json!([{ "latitude": 0.0, "longitude": 0.0 }]),
        )
        .await;
        mount_forecast(&upstream, &[], &[], &[]).await;
        let base = spawn_app(&upstream, StatusCode::OK).await;

        let resp = reqwest::get(format!(
            "{}/risk?location=null%20island&date=2026-05-10&time=09:30",
            base
        ))
        .await
        .unwrap();
        assert_eq!(resp.status(), 502);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn test_risk_forecast_outage_is_bad_gateway() {
        let upstream = MockServer::start().await;
        mount_geocoding(
            &upstream,
            serde_json::json!([{ "latitude": 47.37, "longitude": 8.55 }]),
        )
        .await;
        Mock::given(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&upstream)
            .await;
        let base = spawn_app(&upstream, StatusCode::OK).await;

        let resp = reqwest::get(format!(
            "{}/risk?location=zurich&date=2026-05-10&time=09:30",
            base
        ))
        .await
        .unwrap();
        assert_eq!(resp.status(), 502);
    }

    #[tokio::test]
    async fn test_health_route() {
        let upstream = MockServer::start().await;
        let base = spawn_app(&upstream, StatusCode::OK).await;

        let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, serde_json::json!({ "status": "Backend running fine" }));
    }
}
