//! Pest and disease alerts derived from the daily forecast.

use crate::models::ForecastDay;

/// Fungal risk needs both humidity above this (%)...
const FUNGAL_HUMIDITY_PCT: f64 = 75.0;
/// ...and temperature above this (°C).
const FUNGAL_TEMP_C: f64 = 20.0;
/// Above this mean temperature (°C) crops suffer heat stress.
const HEAT_STRESS_TEMP_C: f64 = 38.0;

/// Dated risk warnings, in forecast order.
///
/// A day can raise a fungal alert, a heat-stress alert, both, or neither.
pub fn pest_alerts(forecast: Option<&[ForecastDay]>) -> Vec<String> {
    let Some(days) = forecast else {
        return Vec::new();
    };

    let mut alerts = Vec::new();
    for day in days {
        let date = day.date.format("%Y-%m-%d");
        if day.avg_humidity > FUNGAL_HUMIDITY_PCT && day.avg_temp > FUNGAL_TEMP_C {
            alerts.push(format!(
                "{}: high humidity ({:.1}%) with warm temperatures, fungal disease risk. Inspect leaves and consider a preventive fungicide spray.",
                date, day.avg_humidity
            ));
        }
        if day.avg_temp > HEAT_STRESS_TEMP_C {
            alerts.push(format!(
                "{}: very high temperature ({:.1}°C), heat stress risk. Irrigate lightly and often and provide shade where possible.",
                date, day.avg_temp
            ));
        }
    }

    alerts
}
