//! Domain records shared by the advisory engine and its adapters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Dominant local soil composition.
///
/// Parsing is total: anything outside the known set is kept verbatim as
/// `Unrecognized` so the engine can fall back to generic advice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SoilType {
    Alluvial,
    Black,
    Red,
    Laterite,
    Sandy,
    Clay,
    Unrecognized(String),
}

impl SoilType {
    pub const KNOWN: [SoilType; 6] = [
        SoilType::Alluvial,
        SoilType::Black,
        SoilType::Red,
        SoilType::Laterite,
        SoilType::Sandy,
        SoilType::Clay,
    ];

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "alluvial" => SoilType::Alluvial,
            "black" => SoilType::Black,
            "red" => SoilType::Red,
            "laterite" => SoilType::Laterite,
            "sandy" => SoilType::Sandy,
            "clay" => SoilType::Clay,
            _ => SoilType::Unrecognized(raw.trim().to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, SoilType::Unrecognized(_))
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SoilType::Alluvial => "Alluvial",
            SoilType::Black => "Black",
            SoilType::Red => "Red",
            SoilType::Laterite => "Laterite",
            SoilType::Sandy => "Sandy",
            SoilType::Clay => "Clay",
            SoilType::Unrecognized(raw) => raw.as_str(),
        };
        f.write_str(name)
    }
}

impl From<String> for SoilType {
    fn from(raw: String) -> Self {
        SoilType::parse(&raw)
    }
}

impl From<SoilType> for String {
    fn from(soil: SoilType) -> Self {
        soil.to_string()
    }
}

/// Current phenological phase of the crop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CropStage {
    Sowing,
    Vegetative,
    Flowering,
    Harvesting,
    Unrecognized(String),
}

impl CropStage {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sowing" => CropStage::Sowing,
            "vegetative" => CropStage::Vegetative,
            "flowering" => CropStage::Flowering,
            // Older dashboards labelled the last stage "Harvest"
            "harvesting" | "harvest" => CropStage::Harvesting,
            _ => CropStage::Unrecognized(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for CropStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CropStage::Sowing => "Sowing",
            CropStage::Vegetative => "Vegetative",
            CropStage::Flowering => "Flowering",
            CropStage::Harvesting => "Harvesting",
            CropStage::Unrecognized(raw) => raw.as_str(),
        };
        f.write_str(name)
    }
}

impl From<String> for CropStage {
    fn from(raw: String) -> Self {
        CropStage::parse(&raw)
    }
}

impl From<CropStage> for String {
    fn from(stage: CropStage) -> Self {
        stage.to_string()
    }
}

/// Current conditions at the farmer's location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherSnapshot {
    /// Air temperature in Celsius
    pub temperature: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Short description, e.g. "light rain"
    pub condition: String,
}

/// Daily summary of forecast samples sharing one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastDay {
    pub date: NaiveDate,
    /// Mean temperature across the day's samples (°C)
    pub avg_temp: f64,
    /// Mean relative humidity across the day's samples (%)
    pub avg_humidity: f64,
    /// Most frequent condition among the day's samples
    pub condition: String,
}

/// One farmer session: inputs plus the advisory derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdvisoryEntry {
    pub timestamp: DateTime<Utc>,
    pub farmer_name: String,
    pub location: String,
    #[schema(value_type = String, example = "Alluvial")]
    pub soil_type: SoilType,
    #[schema(value_type = String, example = "Vegetative")]
    pub crop_stage: CropStage,
    pub weather: Option<WeatherSnapshot>,
    pub forecast: Option<Vec<ForecastDay>>,
    pub advisory_lines: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soil_parse_case_insensitive() {
        assert_eq!(SoilType::parse(" alluvial "), SoilType::Alluvial);
        assert_eq!(SoilType::parse("BLACK"), SoilType::Black);
    }

    #[test]
    fn test_soil_parse_unknown_is_kept() {
        let soil = SoilType::parse("Peaty");
        assert_eq!(soil, SoilType::Unrecognized("Peaty".to_string()));
        assert!(!soil.is_recognized());
        assert_eq!(soil.to_string(), "Peaty");
    }

    #[test]
    fn test_stage_harvest_alias() {
        assert_eq!(CropStage::parse("Harvest"), CropStage::Harvesting);
        assert_eq!(CropStage::parse("harvesting"), CropStage::Harvesting);
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&SoilType::Laterite).unwrap();
        assert_eq!(json, "\"Laterite\"");
        let stage: CropStage = serde_json::from_str("\"flowering\"").unwrap();
        assert_eq!(stage, CropStage::Flowering);
    }
}
