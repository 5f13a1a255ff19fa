use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::routes::advisory::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status, always "ok" when the process is serving
    pub status: String,
    /// API version
    pub version: String,
    /// Whether an OpenWeatherMap key is configured
    pub weather_configured: bool,
}

/// Health check endpoint.
///
/// Returns the API status and version. The service has no database, so the
/// only thing worth reporting is whether weather lookups can happen at all.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        weather_configured: state.weather_client.is_some(),
    })
}
