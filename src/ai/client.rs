use crate::types::Attachment;
use async_trait::async_trait;
use std::sync::Arc;

/// Reply used when the upstream call fails for any reason.
pub const FAILURE_SENTINEL: &str = "Sorry, something went wrong contacting Gemini.";
/// Reply used when the upstream answered but carried no text.
pub const EMPTY_REPLY_SENTINEL: &str = "No response from Gemini.";

// ============================================
// Error Types
// ============================================

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gemini error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type InferenceResult<T> = Result<T, InferenceError>;

// ============================================
// Backend seam
// ============================================

/// What a single turn sends upstream.
#[derive(Clone, Copy, Debug)]
pub struct Prompt<'a> {
    pub text: &'a str,
    pub audio: Option<&'a Attachment>,
}

impl Prompt<'_> {
    pub fn has_audio(&self) -> bool {
        self.audio.is_some_and(|a| !a.is_empty())
    }
}

/// One attempt against a generative-content endpoint.
///
/// `Ok(None)` means the call succeeded but the response held no text.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn generate(&self, credential: &str, prompt: Prompt<'_>) -> InferenceResult<Option<String>>;
}

#[async_trait]
impl<T: InferenceBackend + ?Sized> InferenceBackend for Arc<T> {
    async fn generate(&self, credential: &str, prompt: Prompt<'_>) -> InferenceResult<Option<String>> {
        (**self).generate(credential, prompt).await
    }
}

// ============================================
// Infallible client
// ============================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyOutcome {
    Delivered,
    Empty,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub outcome: ReplyOutcome,
}

impl Reply {
    pub fn delivered(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            outcome: ReplyOutcome::Delivered,
        }
    }

    pub fn empty() -> Self {
        Self {
            text: EMPTY_REPLY_SENTINEL.to_string(),
            outcome: ReplyOutcome::Empty,
        }
    }

    pub fn failed() -> Self {
        Self {
            text: FAILURE_SENTINEL.to_string(),
            outcome: ReplyOutcome::Failed,
        }
    }
}

/// Turns any backend into the `send -> reply text` contract the session uses.
#[derive(Clone)]
pub struct InferenceClient {
    backend: Arc<dyn InferenceBackend>,
}

impl InferenceClient {
    pub fn new(backend: impl InferenceBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn from_shared(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend }
    }

    /// Exactly one upstream attempt. Errors are logged and become the failure sentinel.
    pub async fn send(&self, text: &str, credential: &str, audio: Option<&Attachment>) -> Reply {
        let prompt = Prompt { text, audio };
        match self.backend.generate(credential, prompt).await {
            Ok(Some(text)) => Reply::delivered(text),
            Ok(None) => {
                tracing::warn!("Gemini response carried no text");
                Reply::empty()
            }
            Err(err) => {
                tracing::error!(error = %err, has_audio = prompt.has_audio(), "Gemini API error");
                Reply::failed()
            }
        }
    }
}
