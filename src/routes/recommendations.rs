//! Static crop and fertilizer recommendations.
//!
//! GET /api/v1/recommendations/:soil

use axum::extract::Path;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::models::SoilType;
use crate::services::tables::{crops_for_soil, fertilizers_for_crop};

#[derive(Debug, Serialize, ToSchema)]
pub struct CropRecommendation {
    pub crop: String,
    pub fertilizers: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationResponse {
    pub soil: String,
    /// Suitable crops, most recommended first
    pub crops: Vec<CropRecommendation>,
}

/// Crops suited to a soil type, each with its usual fertilizers.
#[utoipa::path(
    get,
    path = "/api/v1/recommendations/{soil}",
    tag = "Recommendations",
    params(
        ("soil" = String, Path, description = "Soil type, e.g. Alluvial"),
    ),
    responses(
        (status = 200, description = "Crop and fertilizer recommendations", body = RecommendationResponse),
        (status = 404, description = "Unknown soil type", body = ErrorResponse),
    )
)]
pub async fn get_recommendations(
    Path(soil): Path<String>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let soil = SoilType::parse(&soil);
    if !soil.is_recognized() {
        let known: Vec<String> = SoilType::KNOWN.iter().map(|s| s.to_string()).collect();
        return Err(AppError::NotFound(format!(
            "Unknown soil type '{}'. Known soil types: {}",
            soil,
            known.join(", ")
        )));
    }

    let crops = crops_for_soil(&soil)
        .iter()
        .map(|crop| CropRecommendation {
            crop: crop.to_string(),
            fertilizers: fertilizers_for_crop(crop)
                .iter()
                .map(|f| f.to_string())
                .collect(),
        })
        .collect();

    Ok(Json(RecommendationResponse {
        soil: soil.to_string(),
        crops,
    }))
}
