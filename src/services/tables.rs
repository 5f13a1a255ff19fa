//! Static recommendation tables: soil → crops, crop → fertilizers.

use crate::models::SoilType;

/// Crops best suited to a soil, most recommended first.
///
/// Unrecognized soils have no entry.
pub fn crops_for_soil(soil: &SoilType) -> &'static [&'static str] {
    match soil {
        SoilType::Alluvial => &["Rice", "Wheat", "Sugarcane", "Pulses"],
        SoilType::Black => &["Cotton", "Soybean", "Sorghum", "Groundnut"],
        SoilType::Red => &["Millets", "Groundnut", "Pulses", "Potato"],
        SoilType::Laterite => &["Cashew", "Tea", "Coffee", "Rubber"],
        SoilType::Sandy => &["Bajra", "Groundnut", "Watermelon", "Guar"],
        SoilType::Clay => &["Rice", "Jute", "Sugarcane", "Wheat"],
        SoilType::Unrecognized(_) => &[],
    }
}

/// Common fertilizers for a crop. Lookup ignores case.
pub fn fertilizers_for_crop(crop: &str) -> &'static [&'static str] {
    match crop.trim().to_ascii_lowercase().as_str() {
        "rice" => &["Urea", "DAP", "Muriate of Potash", "Zinc Sulphate"],
        "wheat" => &["Urea", "DAP", "Muriate of Potash"],
        "sugarcane" => &["Urea", "Single Super Phosphate", "Muriate of Potash"],
        "pulses" => &["DAP", "Rhizobium culture", "Gypsum"],
        "cotton" => &["Urea", "DAP", "Muriate of Potash", "Magnesium Sulphate"],
        "soybean" => &["Single Super Phosphate", "Rhizobium culture", "Muriate of Potash"],
        "sorghum" => &["Urea", "DAP"],
        "groundnut" => &["Gypsum", "Single Super Phosphate", "Rhizobium culture"],
        "millets" | "bajra" => &["Urea", "DAP", "Farmyard manure"],
        "potato" => &["NPK 10:26:26", "Urea", "Farmyard manure"],
        "cashew" => &["Urea", "Rock Phosphate", "Muriate of Potash"],
        "tea" => &["Ammonium Sulphate", "Muriate of Potash", "Dolomite"],
        "coffee" => &["NPK 17:17:17", "Dolomite", "Compost"],
        "rubber" => &["NPK 10:10:4:1.5", "Rock Phosphate"],
        "watermelon" => &["NPK 19:19:19", "Calcium Nitrate"],
        "guar" => &["DAP", "Rhizobium culture"],
        "jute" => &["Urea", "Single Super Phosphate", "Muriate of Potash"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_soil_has_crops() {
        for soil in SoilType::KNOWN.iter() {
            assert!(!crops_for_soil(soil).is_empty(), "{} has no crops", soil);
        }
    }

    #[test]
    fn test_every_listed_crop_has_fertilizers() {
        for soil in SoilType::KNOWN.iter() {
            for crop in crops_for_soil(soil) {
                assert!(
                    !fertilizers_for_crop(crop).is_empty(),
                    "{} has no fertilizers",
                    crop
                );
            }
        }
    }

    #[test]
    fn test_unknown_lookups_are_empty() {
        assert!(crops_for_soil(&SoilType::parse("Peaty")).is_empty());
        assert!(fertilizers_for_crop("Dragonfruit").is_empty());
    }

    #[test]
    fn test_fertilizer_lookup_ignores_case() {
        assert_eq!(fertilizers_for_crop("RICE"), fertilizers_for_crop("rice"));
    }
}
