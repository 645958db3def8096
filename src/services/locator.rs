//! Place-name resolution.

use crate::errors::AppError;
use crate::services::open_meteo::{Coordinates, OpenMeteoClient};

/// Resolve a free-text place name to the coordinates of its best geocoding match.
///
/// Only the first candidate is used; there is no disambiguation between
/// places sharing a name. No candidates yields `LocationNotFound`.
pub async fn resolve(
    client: &OpenMeteoClient,
    location_name: &str,
) -> Result<Coordinates, AppError> {
    let place = client
        .search_place(location_name)
        .await?
        .ok_or_else(|| AppError::LocationNotFound(location_name.to_string()))?;

    tracing::debug!(
        "Resolved '{}' to {} ({}) at {}, {}",
        location_name,
        place.name.as_deref().unwrap_or("?"),
        place.country.as_deref().unwrap_or("?"),
        place.coordinates.latitude,
        place.coordinates.longitude
    );

    Ok(place.coordinates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use wiremock::matchers::{path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_with_results(results: serde_json::Value) -> (MockServer, OpenMeteoClient) {
        let server = MockServer::start().await;
        Mock::given(path("/v1/search"))
            .and(query_param("count", "1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": results })),
            )
            .mount(&server)
            .await;

        let config = AppConfig {
            geocoding_url: server.uri(),
            ..AppConfig::default()
        };
        let client = OpenMeteoClient::new(&config).unwrap();
        (server, client)
    }

    #[tokio::test]
    async fn test_resolve_returns_first_candidate() {
        let (_server, client) = client_with_results(serde_json::json!([
            { "name": "Paris", "country": "France", "latitude": 48.85341, "longitude": 2.3488 },
            { "name": "Paris", "country": "United States", "latitude": 33.66094, "longitude": -95.55551 }
        ]))
        .await;

        let coords = resolve(&client, "paris").await.unwrap();
        assert_eq!(
            coords,
            Coordinates {
                latitude: 48.85341,
                longitude: 2.3488
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_no_candidates_is_location_not_found() {
        let (_server, client) = client_with_results(serde_json::json!([])).await;

        match resolve(&client, "Xyzzyville").await {
            Err(AppError::LocationNotFound(name)) => assert_eq!(name, "Xyzzyville"),
            other => panic!("expected LocationNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_upstream_failure_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(path("/v1/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let config = AppConfig {
            geocoding_url: server.uri(),
            ..AppConfig::default()
        };
        let client = OpenMeteoClient::new(&config).unwrap();

        let result = resolve(&client, "Oslo").await;
        assert!(matches!(result, Err(AppError::FetchError(_))));
    }
}
