//! Soil/stage advisory generator.
//!
//! Produces the ordered advice lines shown to the farmer: one soil line,
//! then any weather warnings, then one stage line.

use crate::models::{CropStage, SoilType, WeatherSnapshot};
use crate::services::tables::crops_for_soil;

/// Above this temperature (°C) irrigation should be more frequent.
const HOT_TEMP_C: f64 = 35.0;

/// Below this temperature (°C) young plants need cover.
const COLD_TEMP_C: f64 = 15.0;

/// Above this relative humidity (%) fungal disease becomes likely.
const HUMID_PCT: u8 = 70;

pub const SOIL_FALLBACK_LINE: &str =
    "Soil type not recognised: consider crop rotation and soil testing.";

pub const HOT_WEATHER_LINE: &str =
    "High temperature: increase irrigation frequency and irrigate in the early morning or evening.";

pub const COLD_WEATHER_LINE: &str =
    "Low temperature: cover young plants or use mulch to protect them from cold stress.";

pub const HUMID_WEATHER_LINE: &str =
    "High humidity: watch for fungal diseases and avoid overhead watering.";

/// Generate the advisory lines for a farmer session.
///
/// Total over its inputs: unknown soils get the fallback line, unknown
/// stages get no stage line, and a missing snapshot skips the weather rules.
pub fn generate_advisory(
    soil: &SoilType,
    weather: Option<&WeatherSnapshot>,
    stage: &CropStage,
) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(soil_line(soil));

    if let Some(w) = weather {
        if w.temperature > HOT_TEMP_C {
            lines.push(HOT_WEATHER_LINE.to_string());
        }
        if w.temperature < COLD_TEMP_C {
            lines.push(COLD_WEATHER_LINE.to_string());
        }
        if w.humidity > HUMID_PCT {
            lines.push(HUMID_WEATHER_LINE.to_string());
        }
    }

    if let Some(line) = stage_line(stage) {
        lines.push(line.to_string());
    }

    lines
}

fn soil_line(soil: &SoilType) -> String {
    match soil {
        SoilType::Alluvial
        | SoilType::Black
        | SoilType::Red
        | SoilType::Laterite
        | SoilType::Sandy
        | SoilType::Clay => format!(
            "Best crops for {} soil: {}.",
            soil,
            crops_for_soil(soil).join(", ")
        ),
        SoilType::Unrecognized(_) => SOIL_FALLBACK_LINE.to_string(),
    }
}

fn stage_line(stage: &CropStage) -> Option<&'static str> {
    match stage {
        CropStage::Sowing => Some(
            "Sowing stage: apply a basal dose of DAP and farmyard manure and keep the seedbed moist.",
        ),
        CropStage::Vegetative => Some(
            "Vegetative stage: top-dress with nitrogen (urea) and keep fields free of weeds.",
        ),
        CropStage::Flowering => Some(
            "Flowering stage: apply potash and micronutrients and avoid water stress.",
        ),
        CropStage::Harvesting => Some(
            "Harvesting stage: stop irrigation a week before harvest and dry the produce well before storage.",
        ),
        CropStage::Unrecognized(_) => None,
    }
}
