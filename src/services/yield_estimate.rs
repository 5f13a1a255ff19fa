//! Rule-based relative yield estimator.
//!
//! Starts from a base factor and applies independent additive adjustments
//! for soil, stage and near-term weather, then clamps into
//! `[MIN_FACTOR, MAX_FACTOR]`. Arithmetic is exact decimal so the rendered
//! percentage never drifts (0.60 - 0.08 - 0.06 is 46%, not 45%).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{CropStage, ForecastDay, SoilType, WeatherSnapshot};

/// Factor expressed in hundredths.
fn hundredths(n: i64) -> Decimal {
    Decimal::new(n, 2)
}

const BASE: i64 = 60;
const MIN_FACTOR: i64 = 20;
const MAX_FACTOR: i64 = 98;

const ALLUVIAL_BONUS: i64 = 15;
const BLACK_BONUS: i64 = 10;
const VEGETATIVE_BONUS: i64 = 5;
const FLOWERING_BONUS: i64 = 2;
const HEAT_PENALTY: i64 = 8;
const HUMIDITY_PENALTY: i64 = 6;

/// Above this mean temperature (°C) heat reduces yield.
const HEAT_TEMP_C: f64 = 35.0;
/// Above this mean humidity (%) disease pressure reduces yield.
const HUMID_PCT: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct YieldEstimate {
    /// Relative yield factor, always within [0.2, 0.98]
    pub factor: f64,
    /// Human-readable rendering, e.g. "Estimated relative yield: 80% (rule-based approx)."
    pub text: String,
}

/// The single set of near-term conditions the weather adjustment looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldConditions {
    pub temperature: f64,
    pub humidity: f64,
}

impl YieldConditions {
    /// Nearest-date forecast entry when one exists, else the current snapshot.
    pub fn nearest(
        forecast: Option<&[ForecastDay]>,
        weather: Option<&WeatherSnapshot>,
    ) -> Option<Self> {
        forecast
            .and_then(|days| days.first())
            .map(|day| Self {
                temperature: day.avg_temp,
                humidity: day.avg_humidity,
            })
            .or_else(|| {
                weather.map(|w| Self {
                    temperature: w.temperature,
                    humidity: f64::from(w.humidity),
                })
            })
    }
}

/// Estimate relative yield using only the forecast's first day.
pub fn estimate_yield(
    soil: &SoilType,
    forecast: Option<&[ForecastDay]>,
    stage: &CropStage,
) -> YieldEstimate {
    estimate_with_conditions(soil, YieldConditions::nearest(forecast, None), stage)
}

/// Estimate relative yield, falling back to the current snapshot when no
/// forecast day is available.
pub fn estimate_yield_with_fallback(
    soil: &SoilType,
    forecast: Option<&[ForecastDay]>,
    weather: Option<&WeatherSnapshot>,
    stage: &CropStage,
) -> YieldEstimate {
    match weather {
        None => estimate_yield(soil, forecast, stage),
        Some(_) => {
            estimate_with_conditions(soil, YieldConditions::nearest(forecast, weather), stage)
        }
    }
}

fn estimate_with_conditions(
    soil: &SoilType,
    conditions: Option<YieldConditions>,
    stage: &CropStage,
) -> YieldEstimate {
    let mut factor = hundredths(BASE);

    factor += match soil {
        SoilType::Alluvial => hundredths(ALLUVIAL_BONUS),
        SoilType::Black => hundredths(BLACK_BONUS),
        SoilType::Red
        | SoilType::Laterite
        | SoilType::Sandy
        | SoilType::Clay
        | SoilType::Unrecognized(_) => Decimal::ZERO,
    };

    factor += match stage {
        CropStage::Vegetative => hundredths(VEGETATIVE_BONUS),
        CropStage::Flowering => hundredths(FLOWERING_BONUS),
        CropStage::Sowing | CropStage::Harvesting | CropStage::Unrecognized(_) => Decimal::ZERO,
    };

    if let Some(c) = conditions {
        if c.temperature > HEAT_TEMP_C {
            factor -= hundredths(HEAT_PENALTY);
        }
        if c.humidity > HUMID_PCT {
            factor -= hundredths(HUMIDITY_PENALTY);
        }
    }

    let factor = factor.clamp(hundredths(MIN_FACTOR), hundredths(MAX_FACTOR));
    let percent = (factor * Decimal::ONE_HUNDRED)
        .floor()
        .to_i64()
        .unwrap_or(MIN_FACTOR);

    YieldEstimate {
        factor: factor.to_f64().unwrap_or(0.0),
        text: format!(
            "Estimated relative yield: {}% (rule-based approx).",
            percent
        ),
    }
}
