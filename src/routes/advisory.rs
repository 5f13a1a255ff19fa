//! Advisory HTTP endpoints.
//!
//! - POST /api/v1/advisory
//! - GET  /api/v1/advisory/log

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::models::{AdvisoryEntry, CropStage, ForecastDay, SoilType, WeatherSnapshot};
use crate::services::advisory::generate_advisory;
use crate::services::advisory_log::AdvisoryLog;
use crate::services::mandi::{MandiClient, PriceTable};
use crate::services::openweather::{OpenWeatherClient, MAX_FORECAST_DAYS};
use crate::services::pest::pest_alerts;
use crate::services::speech::SpeechClient;
use crate::services::yield_estimate::{estimate_yield_with_fallback, YieldEstimate};

/// Shared application state for all endpoints.
#[derive(Clone)]
pub(crate) struct AppState {
    /// `None` when no OpenWeatherMap key is configured.
    pub(crate) weather_client: Option<OpenWeatherClient>,
    pub(crate) mandi_client: MandiClient,
    pub(crate) speech_client: SpeechClient,
    pub(crate) advisory_log: AdvisoryLog,
    pub(crate) forecast_days: usize,
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Farmer inputs for one advisory session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdvisoryRequest {
    #[serde(default)]
    pub farmer_name: String,
    /// City or village name, used for the weather lookup
    pub location: String,
    /// Alluvial, Black, Red, Laterite, Sandy or Clay; anything else gets generic advice
    #[schema(value_type = String, example = "Alluvial")]
    pub soil_type: SoilType,
    /// Sowing, Vegetative, Flowering or Harvesting
    #[schema(value_type = String, example = "Vegetative")]
    pub crop_stage: CropStage,
    /// State whose mandi prices should be shown (e.g. "Karnataka")
    pub target_state: Option<String>,
    /// Forecast horizon in days (1-5). Defaults to the server setting.
    pub forecast_days: Option<usize>,
    /// Append this session to the advisory log
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdvisoryResponse {
    pub entry: AdvisoryEntry,
    pub yield_estimate: YieldEstimate,
    pub pest_alerts: Vec<String>,
    /// Present when `target_state` was given
    pub prices: Option<PriceTable>,
    /// Whether the entry was appended to the advisory log
    pub saved: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Build a personalised advisory.
///
/// Weather and forecast are fetched concurrently; if either is unavailable
/// the advisory is still produced without it.
#[utoipa::path(
    post,
    path = "/api/v1/advisory",
    tag = "Advisory",
    request_body = AdvisoryRequest,
    responses(
        (status = 200, description = "Advisory, yield estimate, pest alerts and prices", body = AdvisoryResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Advisory log could not be written", body = ErrorResponse),
    )
)]
pub async fn create_advisory(
    State(state): State<AppState>,
    Json(req): Json<AdvisoryRequest>,
) -> Result<Json<AdvisoryResponse>, AppError> {
    let location = req.location.trim();
    if location.is_empty() {
        return Err(AppError::BadRequest("location must not be empty".to_string()));
    }

    let forecast_days = req.forecast_days.unwrap_or(state.forecast_days);
    if !(1..=MAX_FORECAST_DAYS).contains(&forecast_days) {
        return Err(AppError::BadRequest(format!(
            "forecast_days must be between 1 and {}",
            MAX_FORECAST_DAYS
        )));
    }

    let target_state = req
        .target_state
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let prices_future = async {
        match target_state {
            Some(s) => Some(state.mandi_client.fetch_prices(s).await),
            None => None,
        }
    };
    let ((weather, forecast), prices) = futures::join!(
        fetch_conditions(state.weather_client.as_ref(), location, forecast_days),
        prices_future
    );

    let advisory_lines = generate_advisory(&req.soil_type, weather.as_ref(), &req.crop_stage);
    let yield_estimate = estimate_yield_with_fallback(
        &req.soil_type,
        forecast.as_deref(),
        weather.as_ref(),
        &req.crop_stage,
    );
    let alerts = pest_alerts(forecast.as_deref());

    let entry = AdvisoryEntry {
        timestamp: chrono::Utc::now(),
        farmer_name: req.farmer_name.trim().to_string(),
        location: location.to_string(),
        soil_type: req.soil_type,
        crop_stage: req.crop_stage,
        weather,
        forecast,
        advisory_lines,
    };

    if req.save {
        state.advisory_log.append_async(entry.clone()).await?;
    }

    tracing::info!(
        "Advisory for '{}' in {}: {} line(s), {} alert(s), saved={}",
        entry.farmer_name,
        entry.location,
        entry.advisory_lines.len(),
        alerts.len(),
        req.save
    );

    Ok(Json(AdvisoryResponse {
        entry,
        yield_estimate,
        pest_alerts: alerts,
        prices,
        saved: req.save,
    }))
}

/// List all saved advisories, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/advisory/log",
    tag = "Advisory",
    responses(
        (status = 200, description = "Saved advisory entries", body = Vec<AdvisoryEntry>),
        (status = 500, description = "Advisory log could not be read", body = ErrorResponse),
    )
)]
pub async fn get_advisory_log(
    State(state): State<AppState>,
) -> Result<Json<Vec<AdvisoryEntry>>, AppError> {
    let entries = state.advisory_log.read_all_async().await?;
    Ok(Json(entries))
}

/// Current weather and forecast for a location.
///
/// Upstream failures are logged and turned into `None`; the engine only ever
/// sees present-or-absent inputs.
async fn fetch_conditions(
    client: Option<&OpenWeatherClient>,
    location: &str,
    days: usize,
) -> (Option<WeatherSnapshot>, Option<Vec<ForecastDay>>) {
    let Some(client) = client else {
        return (None, None);
    };

    let (current, forecast) = futures::join!(
        client.fetch_current(location),
        client.fetch_forecast(location, days)
    );

    let current = current
        .map_err(|e| tracing::warn!("Current weather unavailable for '{}': {}", location, e))
        .ok();
    let forecast = forecast
        .map_err(|e| tracing::warn!("Forecast unavailable for '{}': {}", location, e))
        .ok();

    (current, forecast)
}
