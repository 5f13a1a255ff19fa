//! Voice advisory endpoint.
//!
//! POST /api/v1/speech: returns MP3 audio for the given text.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::routes::advisory::AppState;

fn default_lang() -> String {
    "en".to_string()
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SpeechRequest {
    /// Text to speak, typically the joined advisory lines
    pub text: String,
    /// Voice language: en, hi, kn or ta
    #[serde(default = "default_lang")]
    pub lang: String,
}

/// Render advisory text as speech.
#[utoipa::path(
    post,
    path = "/api/v1/speech",
    tag = "Speech",
    request_body = SpeechRequest,
    responses(
        (status = 200, description = "MP3 audio", content_type = "audio/mpeg", body = Vec<u8>),
        (status = 400, description = "Empty text or unsupported language", body = ErrorResponse),
        (status = 502, description = "Speech service unavailable", body = ErrorResponse),
    )
)]
pub async fn synthesize_speech(
    State(state): State<AppState>,
    Json(req): Json<SpeechRequest>,
) -> Result<impl IntoResponse, AppError> {
    let audio = state
        .speech_client
        .synthesize(&req.text, req.lang.trim())
        .await?;
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::advisory::tests::offline_state;
    use crate::services::speech::SpeechClient;
    use axum::http::StatusCode;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_returns_mp3() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x49, 0x44, 0x33]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut state = offline_state(dir.path());
        state.speech_client = SpeechClient::new(&server.uri()).unwrap();

        let response = synthesize_speech(
            State(state),
            Json(SpeechRequest {
                text: "Irrigate in the early morning.".to_string(),
                lang: "kn".to_string(),
            }),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    }

    #[tokio::test]
    async fn test_unsupported_language() {
        let dir = tempfile::tempdir().unwrap();
        let result = synthesize_speech(
            State(offline_state(dir.path())),
            Json(SpeechRequest {
                text: "hello".to_string(),
                lang: "de".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
