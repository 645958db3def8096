use axum::http::StatusCode;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";
const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com";

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Plain,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Application configuration, parsed from environment variables.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Title shown in the OpenAPI document.
    pub api_title: String,
    pub api_version: String,
    /// Base URL of the geocoding service (without the `/v1/search` path).
    pub geocoding_url: String,
    /// Base URL of the forecast service (without the `/v1/forecast` path).
    pub forecast_url: String,
    /// Timeout applied to every outbound request.
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Allowed CORS origins. A single `*` mirrors any request origin.
    pub cors_allowed_origins: Vec<String>,
    /// Status code sent with `{"error": "Invalid location"}`.
    pub invalid_location_status: StatusCode,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_title: "Weather Buddy API".to_string(),
            api_version: "1.0".to_string(),
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: "WeatherBuddy/1.0".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
            invalid_location_status: StatusCode::OK,
            log_format: LogFormat::Plain,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("PORT") {
            config.port = value.trim().parse().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                value: value.clone(),
                reason: format!("{}", e),
            })?;
        }
        if let Some(value) = lookup("API_TITLE") {
            config.api_title = value;
        }
        if let Some(value) = lookup("API_VERSION") {
            config.api_version = value;
        }
        if let Some(value) = lookup("GEOCODING_URL") {
            config.geocoding_url = trim_base_url(&value);
        }
        if let Some(value) = lookup("FORECAST_URL") {
            config.forecast_url = trim_base_url(&value);
        }
        if let Some(value) = lookup("HTTP_TIMEOUT_SECS") {
            let secs: u64 = value.trim().parse().map_err(|e| ConfigError::Invalid {
                var: "HTTP_TIMEOUT_SECS",
                value: value.clone(),
                reason: format!("{}", e),
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: "HTTP_TIMEOUT_SECS",
                    value,
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(value) = lookup("HTTP_USER_AGENT") {
            config.user_agent = value;
        }
        if let Some(value) = lookup("CORS_ALLOWED_ORIGINS") {
            config.cors_allowed_origins = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = lookup("INVALID_LOCATION_STATUS") {
            config.invalid_location_status = value
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|code| (100..600).contains(code))
                .and_then(|code| StatusCode::from_u16(code).ok())
                .ok_or_else(|| ConfigError::Invalid {
                    var: "INVALID_LOCATION_STATUS",
                    value: value.clone(),
                    reason: "must be an HTTP status code between 100 and 599".to_string(),
                })?;
        }
        if let Some(value) = lookup("LOG_FORMAT") {
            config.log_format = match value.trim().to_lowercase().as_str() {
                "plain" | "text" => LogFormat::Plain,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "LOG_FORMAT",
                        value,
                        reason: "expected 'plain' or 'json'".to_string(),
                    })
                }
            };
        }

        Ok(config)
    }

    /// True when any origin may call the API.
    pub fn cors_allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.is_empty() || self.cors_allowed_origins.iter().any(|o| o == "*")
    }
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
