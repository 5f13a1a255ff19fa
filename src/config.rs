use crate::services::mandi::DEFAULT_DATA_GOV_BASE_URL;
use crate::services::openweather::{DEFAULT_OWM_BASE_URL, MAX_FORECAST_DAYS};
use crate::services::speech::DEFAULT_TTS_BASE_URL;

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// OpenWeatherMap key. Without it every advisory is built without weather.
    pub owm_api_key: Option<String>,
    pub owm_base_url: String,
    /// data.gov.in key. Without it mandi prices come from the sample table.
    pub data_gov_api_key: Option<String>,
    pub data_gov_base_url: String,
    pub tts_base_url: String,
    /// CSV file that saved advisories are appended to.
    pub advisory_log_path: String,
    /// Default forecast horizon in days (1-5).
    pub forecast_days: usize,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            owm_api_key: non_empty_var("OWM_API_KEY"),
            owm_base_url: non_empty_var("OWM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OWM_BASE_URL.to_string()),
            data_gov_api_key: non_empty_var("DATA_GOV_API_KEY"),
            data_gov_base_url: non_empty_var("DATA_GOV_BASE_URL")
                .unwrap_or_else(|| DEFAULT_DATA_GOV_BASE_URL.to_string()),
            tts_base_url: non_empty_var("TTS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TTS_BASE_URL.to_string()),
            advisory_log_path: non_empty_var("ADVISORY_LOG_PATH")
                .unwrap_or_else(|| "./data/advisory_log.csv".to_string()),
            forecast_days: non_empty_var("FORECAST_DAYS")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(MAX_FORECAST_DAYS)
                .clamp(1, MAX_FORECAST_DAYS),
        }
    }
}
