/// Inference module for the chat session
///
/// This module wraps the single outbound call to the Gemini
/// `generateContent` endpoint behind a small backend trait.
///
/// # Architecture
///
/// - `client` - `InferenceClient`, which never fails: every error becomes a sentinel reply
/// - `gemini` - `GeminiBackend`, the HTTP implementation of `InferenceBackend`
///
/// # Usage
///
/// ```rust,no_run
/// use gemini_chat::ai::{GeminiBackend, InferenceClient};
/// use gemini_chat::config::AppConfig;
///
/// # async fn example() -> anyhow::Result<()> {
/// let backend = GeminiBackend::from_config(&AppConfig::from_env()?);
/// let client = InferenceClient::new(backend);
/// let reply = client.send("Hello!", "my-api-key", None).await;
/// println!("{}", reply.text);
/// # Ok(())
/// # }
/// ```
mod client;
mod gemini;

pub use client::{
    FAILURE_SENTINEL, EMPTY_REPLY_SENTINEL, InferenceBackend, InferenceClient, InferenceError,
    InferenceResult, Prompt, Reply, ReplyOutcome,
};
pub use gemini::{
    DEFAULT_API_BASE, DEFAULT_MODEL, EMPTY_INPUT_FALLBACK, GeminiBackend, GenerateContentRequest,
    build_request, extract_reply,
};
