//! Risk evaluation.
//!
//! Reduces each hourly series to its arithmetic mean and classifies the means
//! against fixed thresholds (°C, km/h, mm). All comparisons are strict, so a
//! mean sitting exactly on a threshold never raises the flag.

use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::helpers::{format_one_decimal, mean, title_case};
use crate::services::open_meteo::{Coordinates, HourlySeries, OpenMeteoClient};

/// Mean temperature above which the day is very hot (°C).
pub const HOT_THRESHOLD_C: f64 = 35.0;

/// Mean temperature below which the day is very cold (°C).
pub const COLD_THRESHOLD_C: f64 = 10.0;

/// Mean wind speed above which the day is very windy (km/h).
pub const WINDY_THRESHOLD_KMH: f64 = 30.0;

/// Mean precipitation above which the day is very wet (mm).
pub const WET_THRESHOLD_MM: f64 = 2.0;

/// Mean precipitation above which rain alone makes the day uncomfortable (mm).
pub const HEAVY_RAIN_THRESHOLD_MM: f64 = 3.0;

pub const LABEL_HOT: &str = "Very Hot";
pub const LABEL_COLD: &str = "Very Cold";
pub const LABEL_WINDY: &str = "Very Windy";
pub const LABEL_WET: &str = "Very Wet";
pub const LABEL_UNCOMFORTABLE: &str = "Very Uncomfortable";
pub const LABEL_COMFORTABLE: &str = "Looks comfortable!";

/// Per-series means of an hourly forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Averages {
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub precipitation_mm: f64,
}

impl Averages {
    pub fn from_series(series: &HourlySeries) -> Result<Self, AppError> {
        Ok(Self {
            temperature_c: series_mean("temperature", series.temperature_c())?,
            wind_speed_kmh: series_mean("wind speed", series.wind_speed_kmh())?,
            precipitation_mm: series_mean("precipitation", series.precipitation_mm())?,
        })
    }
}

fn series_mean(name: &str, values: &[f64]) -> Result<f64, AppError> {
    mean(values).ok_or_else(|| AppError::NoData(format!("{} series is empty", name)))
}

/// Boolean risk flags derived from `Averages`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskFlags {
    pub very_hot: bool,
    pub very_cold: bool,
    pub very_windy: bool,
    pub very_wet: bool,
    pub very_uncomfortable: bool,
}

impl RiskFlags {
    pub fn classify(averages: &Averages) -> Self {
        let very_hot = averages.temperature_c > HOT_THRESHOLD_C;
        let very_cold = averages.temperature_c < COLD_THRESHOLD_C;
        let heavy_rain = averages.precipitation_mm > HEAVY_RAIN_THRESHOLD_MM;

        Self {
            very_hot,
            very_cold,
            very_windy: averages.wind_speed_kmh > WINDY_THRESHOLD_KMH,
            very_wet: averages.precipitation_mm > WET_THRESHOLD_MM,
            very_uncomfortable: very_hot || very_cold || heavy_rain,
        }
    }

    /// One label per raised flag in hot, cold, windy, wet, uncomfortable order,
    /// or the single comfortable label when nothing is raised.
    pub fn summary(&self) -> Vec<String> {
        let labels: Vec<String> = [
            (self.very_hot, LABEL_HOT),
            (self.very_cold, LABEL_COLD),
            (self.very_windy, LABEL_WINDY),
            (self.very_wet, LABEL_WET),
            (self.very_uncomfortable, LABEL_UNCOMFORTABLE),
        ]
        .into_iter()
        .filter(|(raised, _)| *raised)
        .map(|(_, label)| label.to_string())
        .collect();

        if labels.is_empty() {
            vec![LABEL_COMFORTABLE.to_string()]
        } else {
            labels
        }
    }
}

/// Averaged metrics, formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Metrics {
    /// Mean temperature, e.g. "21.0 °C"
    pub avg_temp: String,
    /// Mean wind speed, e.g. "6.0 km/h"
    pub avg_wind: String,
    /// Mean precipitation, e.g. "0.0 mm"
    pub avg_rain: String,
}

impl Metrics {
    pub fn from_averages(averages: &Averages) -> Self {
        Self {
            avg_temp: format_one_decimal(averages.temperature_c, "°C"),
            avg_wind: format_one_decimal(averages.wind_speed_kmh, "km/h"),
            avg_rain: format_one_decimal(averages.precipitation_mm, "mm"),
        }
    }
}

/// Risk report for one location and forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RiskReport {
    /// Requested location, title-cased
    pub location: String,
    /// Requested date, echoed back unchanged
    pub date: String,
    /// Requested time, echoed back unchanged
    pub time: String,
    /// Labels for every raised flag, or "Looks comfortable!"
    pub summary: Vec<String>,
    pub metrics: Metrics,
    /// Mean temperature above 35 °C
    pub very_hot: bool,
    /// Mean temperature below 10 °C
    pub very_cold: bool,
    /// Mean wind speed above 30 km/h
    pub very_windy: bool,
    /// Mean precipitation above 2 mm
    pub very_wet: bool,
    /// Very hot, very cold, or mean precipitation above 3 mm
    pub very_uncomfortable: bool,
}

impl RiskReport {
    /// Build a report from an already-fetched series. Pure function (no I/O).
    pub fn from_series(
        series: &HourlySeries,
        date: &str,
        time: &str,
        location_label: &str,
    ) -> Result<Self, AppError> {
        let averages = Averages::from_series(series)?;
        let flags = RiskFlags::classify(&averages);

        Ok(Self {
            location: title_case(location_label),
            date: date.to_string(),
            time: time.to_string(),
            summary: flags.summary(),
            metrics: Metrics::from_averages(&averages),
            very_hot: flags.very_hot,
            very_cold: flags.very_cold,
            very_windy: flags.very_windy,
            very_wet: flags.very_wet,
            very_uncomfortable: flags.very_uncomfortable,
        })
    }
}

/// Fetch the hourly forecast for `coords` and classify it.
///
/// `date` and `time` are echoed back; they do not select which hours are
/// averaged. The forecast always covers the provider's current forecast day.
pub async fn evaluate(
    client: &OpenMeteoClient,
    coords: Coordinates,
    date: &str,
    time: &str,
    location_label: &str,
) -> Result<RiskReport, AppError> {
    let series = client.fetch_hourly(coords).await?;
    tracing::debug!(
        "Fetched {} hourly values for {}, {}",
        series.hours(),
        coords.latitude,
        coords.longitude
    );

    RiskReport::from_series(&series, date, time, location_label)
}
