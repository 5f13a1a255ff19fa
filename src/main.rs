// SmartCrop Advisory API v0.1
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod helpers;
mod models;
mod routes;
mod services;

use config::AppConfig;
use routes::advisory::AppState;
use services::advisory_log::AdvisoryLog;
use services::mandi::MandiClient;
use services::openweather::OpenWeatherClient;
use services::speech::SpeechClient;

/// SmartCrop Advisory API: OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SmartCrop Advisory API",
        version = "0.1.0",
        description = "Rule-based crop advisory for farmers. Combines soil type, crop stage \
            and local weather into practical advice, a relative yield estimate and \
            pest/disease alerts, with mandi prices and spoken advisories on the side.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Advisory", description = "Personalised advisory and the saved advisory log"),
        (name = "Recommendations", description = "Static crop and fertilizer tables"),
        (name = "Prices", description = "Mandi commodity prices"),
        (name = "Speech", description = "Spoken advisories"),
    ),
    paths(
        routes::health::health_check,
        routes::advisory::create_advisory,
        routes::advisory::get_advisory_log,
        routes::recommendations::get_recommendations,
        routes::prices::get_prices,
        routes::speech::synthesize_speech,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::advisory::AdvisoryRequest,
            routes::advisory::AdvisoryResponse,
            routes::recommendations::RecommendationResponse,
            routes::recommendations::CropRecommendation,
            routes::speech::SpeechRequest,
            models::AdvisoryEntry,
            models::WeatherSnapshot,
            models::ForecastDay,
            services::yield_estimate::YieldEstimate,
            services::mandi::PriceTable,
            services::mandi::PriceRow,
            services::mandi::PriceSource,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartcrop_advisory=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    let weather_client = match &config.owm_api_key {
        Some(key) => Some(
            OpenWeatherClient::new(&config.owm_base_url, key)
                .expect("Failed to build OpenWeatherMap client"),
        ),
        None => {
            tracing::warn!("OWM_API_KEY not set; advisories will be built without weather data");
            None
        }
    };

    if config.data_gov_api_key.is_none() {
        tracing::info!("DATA_GOV_API_KEY not set; serving sample mandi prices");
    }
    let mandi_client = MandiClient::new(
        &config.data_gov_base_url,
        config.data_gov_api_key.as_deref(),
    )
    .expect("Failed to build data.gov.in client");

    let speech_client =
        SpeechClient::new(&config.tts_base_url).expect("Failed to build speech client");

    let advisory_log = AdvisoryLog::new(&config.advisory_log_path);
    tracing::info!("Advisory log at {}", advisory_log.path().display());

    let app_state = AppState {
        weather_client,
        mandi_client,
        speech_client,
        advisory_log,
        forecast_days: config.forecast_days,
    };

    // CORS: the dashboard front-end is served from elsewhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .route("/api/v1/advisory", post(routes::advisory::create_advisory))
        .route(
            "/api/v1/advisory/log",
            get(routes::advisory::get_advisory_log),
        )
        .route(
            "/api/v1/recommendations/:soil",
            get(routes::recommendations::get_recommendations),
        )
        .route("/api/v1/prices", get(routes::prices::get_prices))
        .route("/api/v1/speech", post(routes::speech::synthesize_speech))
        .with_state(app_state);

    let app = Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
