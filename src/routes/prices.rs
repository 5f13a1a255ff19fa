//! Mandi price endpoint.
//!
//! GET /api/v1/prices?state=Karnataka

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::{AppError, ErrorResponse};
use crate::routes::advisory::AppState;
use crate::services::mandi::PriceTable;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PriceQuery {
    /// Indian state name (e.g. "Punjab")
    pub state: String,
}

/// Commodity prices for a state.
///
/// Falls back to a sample table when live prices are unavailable; unknown
/// states return an empty table rather than an error.
#[utoipa::path(
    get,
    path = "/api/v1/prices",
    tag = "Prices",
    params(PriceQuery),
    responses(
        (status = 200, description = "Price table for the state", body = PriceTable),
        (status = 400, description = "Missing state", body = ErrorResponse),
    )
)]
pub async fn get_prices(
    State(state): State<AppState>,
    Query(params): Query<PriceQuery>,
) -> Result<Json<PriceTable>, AppError> {
    let target = params.state.trim();
    if target.is_empty() {
        return Err(AppError::BadRequest("state must not be empty".to_string()));
    }
    Ok(Json(state.mandi_client.fetch_prices(target).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::advisory::tests::offline_state;
    use crate::services::mandi::PriceSource;

    #[tokio::test]
    async fn test_sample_prices_served() {
        let dir = tempfile::tempdir().unwrap();
        let Json(table) = get_prices(
            State(offline_state(dir.path())),
            Query(PriceQuery {
                state: "West Bengal".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(table.source, PriceSource::Sample);
        assert_eq!(table.rows[0].commodity, "Jute");
    }

    #[tokio::test]
    async fn test_blank_state_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = get_prices(
            State(offline_state(dir.path())),
            Query(PriceQuery {
                state: " ".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
