//! OpenWeatherMap client.
//!
//! Fetches current conditions and the 5-day / 3-hour forecast, and folds the
//! 3-hourly samples into one `ForecastDay` per calendar date.
//! See: https://openweathermap.org/current and https://openweathermap.org/forecast5

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::AppError;
use crate::helpers::{mean_1dp, round_1dp};
use crate::models::{ForecastDay, WeatherSnapshot};

pub const DEFAULT_OWM_BASE_URL: &str = "https://api.openweathermap.org";

/// The free 5-day forecast never covers more than this many dates.
pub const MAX_FORECAST_DAYS: usize = 5;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client for the OpenWeatherMap 2.5 API.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

// --- OpenWeatherMap JSON response types ---

#[derive(Debug, Deserialize)]
struct OwmCurrent {
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmForecast {
    #[serde(default)]
    list: Vec<OwmSample>,
}

#[derive(Debug, Deserialize)]
struct OwmSample {
    dt: i64,
    dt_txt: Option<String>,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
}

fn first_description(conditions: &[OwmCondition]) -> String {
    conditions
        .first()
        .map(|c| c.description.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

/// OpenWeatherMap reports `cod` as the number 200 on /weather and as the
/// string "200" on /forecast; errors use strings like "404".
fn cod_is_ok(raw_json: &serde_json::Value) -> bool {
    match raw_json.get("cod") {
        Some(serde_json::Value::Number(n)) => n.as_i64() == Some(200),
        Some(serde_json::Value::String(s)) => s == "200",
        None => true,
        _ => false,
    }
}

fn owm_message(raw_json: &serde_json::Value) -> String {
    raw_json
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("no message")
        .to_string()
}

impl OpenWeatherClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Current conditions for a city or village name.
    pub async fn fetch_current(&self, location: &str) -> Result<WeatherSnapshot, AppError> {
        let raw_json = self.get_json("/data/2.5/weather", location).await?;
        parse_current(&raw_json)
    }

    /// Daily forecast summaries for the next `days` dates (capped at 5).
    pub async fn fetch_forecast(
        &self,
        location: &str,
        days: usize,
    ) -> Result<Vec<ForecastDay>, AppError> {
        let raw_json = self.get_json("/data/2.5/forecast", location).await?;
        summarize_forecast(&raw_json, days)
    }

    async fn get_json(&self, path: &str, location: &str) -> Result<serde_json::Value, AppError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("OpenWeatherMap request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "OpenWeatherMap returned HTTP {}",
                response.status()
            )));
        }

        let raw_json: serde_json::Value = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("OpenWeatherMap JSON parse error: {}", e))
        })?;

        if !cod_is_ok(&raw_json) {
            return Err(AppError::ExternalServiceError(format!(
                "OpenWeatherMap error for '{}': {}",
                location,
                owm_message(&raw_json)
            )));
        }

        Ok(raw_json)
    }
}

/// Parse a /weather response into a snapshot.
pub fn parse_current(raw_json: &serde_json::Value) -> Result<WeatherSnapshot, AppError> {
    let current: OwmCurrent = serde_json::from_value(raw_json.clone()).map_err(|e| {
        AppError::ExternalServiceError(format!("OpenWeatherMap response structure error: {}", e))
    })?;

    Ok(WeatherSnapshot {
        temperature: round_1dp(current.main.temp),
        humidity: current.main.humidity.round().clamp(0.0, 100.0) as u8,
        condition: first_description(&current.weather),
    })
}

/// Fold a /forecast response into one entry per calendar date.
///
/// This is a pure function (no I/O). Dates come from `dt_txt` when present,
/// else from the `dt` unix timestamp (both UTC). Output is chronological,
/// one entry per date, truncated to `days` (capped at `MAX_FORECAST_DAYS`).
pub fn summarize_forecast(
    raw_json: &serde_json::Value,
    days: usize,
) -> Result<Vec<ForecastDay>, AppError> {
    let forecast: OwmForecast = serde_json::from_value(raw_json.clone()).map_err(|e| {
        AppError::ExternalServiceError(format!("OpenWeatherMap response structure error: {}", e))
    })?;

    struct DayAccumulator {
        date: NaiveDate,
        temps: Vec<f64>,
        humidities: Vec<f64>,
        conditions: Vec<String>,
    }

    let mut by_date: Vec<DayAccumulator> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for sample in &forecast.list {
        let Some(date) = sample_date(sample) else {
            tracing::warn!("Skipping forecast sample with unreadable time (dt={})", sample.dt);
            continue;
        };

        let slot = *index.entry(date).or_insert_with(|| {
            by_date.push(DayAccumulator {
                date,
                temps: Vec::new(),
                humidities: Vec::new(),
                conditions: Vec::new(),
            });
            by_date.len() - 1
        });

        let acc = &mut by_date[slot];
        acc.temps.push(sample.main.temp);
        acc.humidities.push(sample.main.humidity);
        acc.conditions.push(first_description(&sample.weather));
    }

    by_date.sort_by_key(|acc| acc.date);

    Ok(by_date
        .into_iter()
        .take(days.min(MAX_FORECAST_DAYS))
        .map(|acc| ForecastDay {
            date: acc.date,
            avg_temp: mean_1dp(&acc.temps).unwrap_or(0.0),
            avg_humidity: mean_1dp(&acc.humidities).unwrap_or(0.0),
            condition: most_frequent(&acc.conditions),
        })
        .collect())
}

fn sample_date(sample: &OwmSample) -> Option<NaiveDate> {
    sample
        .dt_txt
        .as_deref()
        .and_then(|txt| txt.get(..10))
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .or_else(|| DateTime::from_timestamp(sample.dt, 0).map(|dt| dt.date_naive()))
}

/// Most frequent value; ties go to whichever appeared first.
fn most_frequent(values: &[String]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v.as_str()).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for v in values {
        let count = counts[v.as_str()];
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((v.as_str(), count));
        }
    }

    best.map(|(v, _)| v.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
