use super::{InferenceBackend, InferenceError, InferenceResult, Prompt};
use crate::config::AppConfig;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Text sent when a turn has neither text nor audio; upstream rejects an empty `parts` list.
pub const EMPTY_INPUT_FALLBACK: &str = " ";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini `generateContent` endpoint.
///
/// The key travels in the `x-goog-api-key` header only. No bearer token is
/// sent and the key is never placed in the URL.
pub struct GeminiBackend {
    client: Client,
    endpoint: String,
    text_timeout: Duration,
    audio_timeout: Duration,
}

impl GeminiBackend {
    pub fn new(
        api_base: &str,
        model: &str,
        text_timeout: Duration,
        audio_timeout: Duration,
    ) -> Self {
        Self::with_client(Client::new(), api_base, model, text_timeout, audio_timeout)
    }

    pub fn with_client(
        client: Client,
        api_base: &str,
        model: &str,
        text_timeout: Duration,
        audio_timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/models/{}:generateContent",
                api_base.trim_end_matches('/'),
                model
            ),
            text_timeout,
            audio_timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.api_base,
            &config.model,
            config.text_timeout,
            config.audio_timeout,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Audio turns take longer upstream and get the longer bound.
    pub fn timeout_for(&self, prompt: &Prompt<'_>) -> Duration {
        if prompt.has_audio() {
            self.audio_timeout
        } else {
            self.text_timeout
        }
    }
}

// Gemini request types
#[derive(Serialize, Debug, PartialEq)]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Debug, PartialEq)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

// Gemini response types. Every level may be missing.
#[derive(Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize, Default)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Build the request body: audio part first, then text. Never emits an empty `parts` list.
pub fn build_request(prompt: Prompt<'_>) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(2);

    if let Some(audio) = prompt.audio.filter(|a| !a.is_empty()) {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: audio.mime_type.clone(),
                data: STANDARD.encode(&audio.data),
            },
        });
    }

    if !prompt.text.is_empty() {
        parts.push(Part::Text {
            text: prompt.text.to_string(),
        });
    }

    if parts.is_empty() {
        parts.push(Part::Text {
            text: EMPTY_INPUT_FALLBACK.to_string(),
        });
    }

    GenerateContentRequest {
        contents: vec![Content { parts }],
    }
}

/// First text part of the first candidate, verbatim.
pub fn extract_reply(body: &str) -> InferenceResult<Option<String>> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)?;
    let text = parsed
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts)
        .and_then(|parts| parts.into_iter().find_map(|part| part.text));
    Ok(text)
}

#[async_trait]
impl InferenceBackend for GeminiBackend {
    async fn generate(&self, credential: &str, prompt: Prompt<'_>) -> InferenceResult<Option<String>> {
        let timeout = self.timeout_for(&prompt);
        tracing::debug!(
            endpoint = %self.endpoint,
            has_audio = prompt.has_audio(),
            timeout_secs = timeout.as_secs(),
            "sending Gemini request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, credential)
            .timeout(timeout)
            .json(&build_request(prompt))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(InferenceError::Status { status, body });
        }

        extract_reply(&body)
    }
}
