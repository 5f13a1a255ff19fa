//! Speech synthesis adapter.
//!
//! Uses the Google Translate TTS endpoint, which only accepts short
//! utterances: text is cut into chunks of at most `MAX_CHUNK_CHARS`
//! characters on word boundaries and the MP3 responses are concatenated.

use std::time::Duration;

use crate::errors::AppError;

pub const DEFAULT_TTS_BASE_URL: &str = "https://translate.google.com";

/// Languages offered to farmers: English, Hindi, Kannada, Tamil.
pub const SUPPORTED_LANGUAGES: [&str; 4] = ["en", "hi", "kn", "ta"];

const MAX_CHUNK_CHARS: usize = 100;
const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct SpeechClient {
    client: reqwest::Client,
    base_url: String,
}

impl SpeechClient {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Synthesize `text` in language `lang`, returning MP3 bytes.
    pub async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, AppError> {
        if !SUPPORTED_LANGUAGES.contains(&lang) {
            return Err(AppError::BadRequest(format!(
                "Unsupported voice language '{}', expected one of {}",
                lang,
                SUPPORTED_LANGUAGES.join(", ")
            )));
        }

        let chunks = split_into_chunks(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(AppError::BadRequest("Nothing to speak: text is empty".to_string()));
        }

        let url = format!("{}/translate_tts", self.base_url);
        let total = chunks.len().to_string();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let idx = idx.to_string();
            let textlen = chunk.chars().count().to_string();

            let response = self
                .client
                .get(&url)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", lang),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await
                .map_err(|e| AppError::ExternalServiceError(format!("TTS request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(AppError::ExternalServiceError(format!(
                    "TTS service returned HTTP {}",
                    response.status()
                )));
            }

            let bytes = response.bytes().await.map_err(|e| {
                AppError::ExternalServiceError(format!("TTS response read failed: {}", e))
            })?;
            audio.extend_from_slice(&bytes);
        }

        tracing::debug!(
            "Synthesized {} chunk(s), {} bytes of audio ({})",
            chunks.len(),
            audio.len(),
            lang
        );

        Ok(audio)
    }
}

/// Split text into chunks of at most `max_chars` characters.
///
/// Whitespace separates words; words are never split unless a single word
/// is itself longer than `max_chars`.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
