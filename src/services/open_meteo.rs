//! Open-Meteo geocoding and forecast client.
//!
//! See: https://open-meteo.com/en/docs/geocoding-api and
//! https://open-meteo.com/en/docs

use serde::Deserialize;

use crate::config::AppConfig;
use crate::errors::AppError;

const GEOCODING_PATH: &str = "/v1/search";
const FORECAST_PATH: &str = "/v1/forecast";

/// Hourly variables requested from the forecast API.
const HOURLY_VARIABLES: &str = "temperature_2m,precipitation,wind_speed_10m";

/// Number of forecast days requested. Always one day starting today.
const FORECAST_DAYS: u8 = 1;

/// Client for the Open-Meteo geocoding and forecast APIs.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    geocoding_url: String,
    forecast_url: String,
}

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single geocoding candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub name: Option<String>,
    pub country: Option<String>,
    pub coordinates: Coordinates,
}

/// Hourly forecast series for one forecast day.
///
/// All three series have the same, non-zero length and are indexed by hour.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySeries {
    temperature_c: Vec<f64>,
    wind_speed_kmh: Vec<f64>,
    precipitation_mm: Vec<f64>,
}

impl HourlySeries {
    /// Validate and build a series set.
    ///
    /// Any empty series yields `NoData`; mismatched lengths yield `FetchError`.
    pub fn new(
        temperature_c: Vec<f64>,
        wind_speed_kmh: Vec<f64>,
        precipitation_mm: Vec<f64>,
    ) -> Result<Self, AppError> {
        if temperature_c.is_empty() || wind_speed_kmh.is_empty() || precipitation_mm.is_empty() {
            return Err(AppError::NoData(format!(
                "forecast returned an empty hourly series (temperature: {}, wind: {}, precipitation: {})",
                temperature_c.len(),
                wind_speed_kmh.len(),
                precipitation_mm.len()
            )));
        }
        if temperature_c.len() != wind_speed_kmh.len()
            || temperature_c.len() != precipitation_mm.len()
        {
            return Err(AppError::FetchError(format!(
                "forecast hourly series have mismatched lengths (temperature: {}, wind: {}, precipitation: {})",
                temperature_c.len(),
                wind_speed_kmh.len(),
                precipitation_mm.len()
            )));
        }

        Ok(Self {
            temperature_c,
            wind_speed_kmh,
            precipitation_mm,
        })
    }

    pub fn temperature_c(&self) -> &[f64] {
        &self.temperature_c
    }

    pub fn wind_speed_kmh(&self) -> &[f64] {
        &self.wind_speed_kmh
    }

    pub fn precipitation_mm(&self) -> &[f64] {
        &self.precipitation_mm
    }

    /// Number of hours covered.
    pub fn hours(&self) -> usize {
        self.temperature_c.len()
    }
}

// --- Open-Meteo JSON response types ---

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    latitude: f64,
    longitude: f64,
    name: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: ForecastHourly,
}

#[derive(Debug, Deserialize)]
struct ForecastHourly {
    temperature_2m: Vec<f64>,
    wind_speed_10m: Vec<f64>,
    precipitation: Vec<f64>,
}

/// Error body Open-Meteo sends with 4xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    reason: Option<String>,
}

impl OpenMeteoClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
        })
    }

    /// Look up the single best geocoding match for `name`.
    ///
    /// Returns `Ok(None)` when the geocoder has no candidates.
    pub async fn search_place(&self, name: &str) -> Result<Option<GeocodedPlace>, AppError> {
        let url = format!("{}{}", self.geocoding_url, GEOCODING_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[("name", name), ("count", "1")])
            .send()
            .await
            .map_err(|e| fetch_error("geocoding", e))?;

        let body: GeocodingResponse = read_json("geocoding", response).await?;

        Ok(body.results.into_iter().next().map(|r| GeocodedPlace {
            name: r.name,
            country: r.country,
            coordinates: Coordinates {
                latitude: r.latitude,
                longitude: r.longitude,
            },
        }))
    }

    /// Fetch one forecast day of hourly temperature, wind speed and precipitation.
    pub async fn fetch_hourly(&self, coords: Coordinates) -> Result<HourlySeries, AppError> {
        let url = format!("{}{}", self.forecast_url, FORECAST_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("hourly", HOURLY_VARIABLES.to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
            ])
            .send()
            .await
            .map_err(|e| fetch_error("forecast", e))?;

        let body: ForecastResponse = read_json("forecast", response).await?;
        let hourly = body.hourly;

        HourlySeries::new(
            hourly.temperature_2m,
            hourly.wind_speed_10m,
            hourly.precipitation,
        )
    }
}

fn fetch_error(service: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        tracing::warn!("{} request timed out", service);
        AppError::FetchError(format!("{} request timed out: {}", service, err))
    } else {
        AppError::FetchError(format!("{} request failed: {}", service, err))
    }
}

/// Check the status and decode a JSON body, mapping every failure to `FetchError`.
async fn read_json<T>(service: &str, response: reqwest::Response) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        let reason = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|b| b.reason);
        return Err(AppError::FetchError(match reason {
            Some(reason) => format!("{} service returned HTTP {}: {}", service, status, reason),
            None => format!("{} service returned HTTP {}", service, status),
        }));
    }

    response.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            AppError::FetchError(format!("{} response malformed: {}", service, e))
        } else {
            fetch_error(service, e)
        }
    })
}
