//! Mandi (commodity market) price lookup.
//!
//! Live prices come from the data.gov.in "current daily price of various
//! commodities" resource. Without an API key, or when the live call fails or
//! returns nothing, a small sample table for the state is served instead.
//! Unknown states get an empty table. The lookup never fails.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::helpers::parse_price;

pub const DEFAULT_DATA_GOV_BASE_URL: &str = "https://api.data.gov.in";

const DAILY_PRICE_RESOURCE: &str = "9ef84268-d588-465a-a308-a864a43d0070";
const PRICE_ROW_LIMIT: &str = "20";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// One market quote (modal price, ₹ per quintal).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceRow {
    pub commodity: String,
    #[schema(value_type = String, example = "2150")]
    pub price: Decimal,
    pub market: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Live,
    Sample,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PriceTable {
    pub state: String,
    pub source: PriceSource,
    pub rows: Vec<PriceRow>,
}

// --- data.gov.in JSON response types ---

#[derive(Debug, Deserialize)]
struct DataGovResponse {
    #[serde(default)]
    records: Vec<DataGovRecord>,
}

#[derive(Debug, Deserialize)]
struct DataGovRecord {
    commodity: Option<String>,
    market: Option<String>,
    /// Arrives as a string or a number depending on the resource version.
    #[serde(default)]
    modal_price: serde_json::Value,
}

fn json_to_price(v: &serde_json::Value) -> Option<Decimal> {
    match v {
        serde_json::Value::String(s) => parse_price(s),
        serde_json::Value::Number(n) => parse_price(&n.to_string()),
        _ => None,
    }
}

/// Client for the data.gov.in price resource.
#[derive(Debug, Clone)]
pub struct MandiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl MandiClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
        })
    }

    /// Price table for a state: live when possible, otherwise sample rows.
    pub async fn fetch_prices(&self, state: &str) -> PriceTable {
        let state = state.trim();

        if let Some(key) = &self.api_key {
            match self.fetch_live(key, state).await {
                Ok(rows) if !rows.is_empty() => {
                    return PriceTable {
                        state: state.to_string(),
                        source: PriceSource::Live,
                        rows,
                    };
                }
                Ok(_) => {
                    tracing::info!("No live mandi prices for '{}', using sample table", state);
                }
                Err(e) => {
                    tracing::warn!("Mandi price lookup failed for '{}': {}", state, e);
                }
            }
        }

        PriceTable {
            state: state.to_string(),
            source: PriceSource::Sample,
            rows: sample_prices(state),
        }
    }

    async fn fetch_live(&self, key: &str, state: &str) -> Result<Vec<PriceRow>, AppError> {
        let url = format!("{}/resource/{}", self.base_url, DAILY_PRICE_RESOURCE);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api-key", key),
                ("format", "json"),
                ("limit", PRICE_ROW_LIMIT),
                ("filters[state.keyword]", state),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("data.gov.in request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "data.gov.in returned HTTP {}",
                response.status()
            )));
        }

        let body: DataGovResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("data.gov.in JSON parse error: {}", e))
        })?;

        Ok(body
            .records
            .into_iter()
            .filter_map(|r| {
                Some(PriceRow {
                    commodity: r.commodity?,
                    price: json_to_price(&r.modal_price)?,
                    market: r.market.unwrap_or_else(|| "unknown".to_string()),
                })
            })
            .collect())
    }
}

/// Static sample quotes for a handful of states. Lookup ignores case.
pub fn sample_prices(state: &str) -> Vec<PriceRow> {
    let rows: &[(&str, i64, &str)] = match state.trim().to_ascii_lowercase().as_str() {
        "karnataka" => &[
            ("Ragi", 3846, "Bangalore"),
            ("Maize", 2090, "Davangere"),
            ("Tur", 7550, "Kalaburagi"),
        ],
        "maharashtra" => &[
            ("Cotton", 7020, "Akola"),
            ("Soybean", 4600, "Latur"),
            ("Onion", 1800, "Lasalgaon"),
        ],
        "punjab" => &[
            ("Wheat", 2275, "Khanna"),
            ("Paddy", 2183, "Amritsar"),
            ("Maize", 1962, "Hoshiarpur"),
        ],
        "uttar pradesh" => &[
            ("Wheat", 2250, "Agra"),
            ("Potato", 1100, "Farrukhabad"),
            ("Mustard", 5450, "Mathura"),
        ],
        "tamil nadu" => &[
            ("Paddy", 2203, "Thanjavur"),
            ("Groundnut", 6377, "Tindivanam"),
            ("Coconut", 2950, "Pollachi"),
        ],
        "west bengal" => &[
            ("Jute", 5050, "Kolkata"),
            ("Rice", 3100, "Burdwan"),
            ("Potato", 1250, "Hooghly"),
        ],
        _ => &[],
    };

    rows.iter()
        .map(|(commodity, price, market)| PriceRow {
            commodity: commodity.to_string(),
            price: Decimal::from(*price),
            market: market.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_sample_prices_known_state() {
        let rows = sample_prices("Punjab");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].commodity, "Wheat");
        assert_eq!(rows[0].price, Decimal::from(2275));
    }

    #[test]
    fn test_sample_prices_ignore_case() {
        assert_eq!(sample_prices("TAMIL NADU"), sample_prices("tamil nadu"));
    }

    #[test]
    fn test_sample_prices_unknown_state_is_empty() {
        assert!(sample_prices("Atlantis").is_empty());
    }

    #[test]
    fn test_json_to_price() {
        assert_eq!(
            json_to_price(&serde_json::json!("2150.5")),
            Some(Decimal::from_str("2150.5").unwrap())
        );
        assert_eq!(json_to_price(&serde_json::json!(1980)), Some(Decimal::from(1980)));
        assert_eq!(json_to_price(&serde_json::Value::Null), None);
    }

    #[tokio::test]
    async fn test_without_key_serves_sample() {
        let client = MandiClient::new("http://127.0.0.1:9", None).unwrap();
        let table = client.fetch_prices("Karnataka").await;
        assert_eq!(table.source, PriceSource::Sample);
        assert_eq!(table.rows.len(), 3);
    }

    #[tokio::test]
    async fn test_live_rows_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/resource/{}", DAILY_PRICE_RESOURCE)))
            .and(query_param("api-key", "k"))
            .and(query_param("filters[state.keyword]", "Karnataka"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "records": [
                    { "state": "Karnataka", "market": "Mysore", "commodity": "Rice", "modal_price": "3200" },
                    { "state": "Karnataka", "market": "Hubli", "commodity": "Onion", "modal_price": 1500 },
                    { "state": "Karnataka", "market": "Hubli", "commodity": "Garlic", "modal_price": "NR" }
                ]
            })))
            .mount(&server)
            .await;

        let client = MandiClient::new(&server.uri(), Some("k")).unwrap();
        let table = client.fetch_prices("Karnataka").await;
        assert_eq!(table.source, PriceSource::Live);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].market, "Mysore");
        assert_eq!(table.rows[1].price, Decimal::from(1500));
    }

    #[tokio::test]
    async fn test_live_failure_falls_back_to_sample() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = MandiClient::new(&server.uri(), Some("k")).unwrap();
        let table = client.fetch_prices("Maharashtra").await;
        assert_eq!(table.source, PriceSource::Sample);
        assert_eq!(table.rows[0].commodity, "Cotton");
    }

    #[tokio::test]
    async fn test_unknown_state_live_empty_gives_empty_table() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "records": [] })),
            )
            .mount(&server)
            .await;

        let client = MandiClient::new(&server.uri(), Some("k")).unwrap();
        let table = client.fetch_prices("Atlantis").await;
        assert!(table.rows.is_empty());
    }
}
