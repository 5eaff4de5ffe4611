//! Base trait for intent-detection providers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// One utterance to classify within a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectIntentRequest {
    /// Conversation identifier, stable for the whole browser session
    pub session_id: String,
    pub text: String,
    pub language_code: String,
}

impl DetectIntentRequest {
    pub fn new(
        session_id: impl Into<String>,
        text: impl Into<String>,
        language_code: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            text: text.into(),
            language_code: language_code.into(),
        }
    }
}

/// The parts of a detect-intent result the front-end cares about
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectIntentResponse {
    #[serde(default)]
    pub response_id: String,
    /// Reply text, verbatim; may be empty
    #[serde(default)]
    pub fulfillment_text: String,
    /// Display name of the matched intent
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Trait for intent-detection providers
#[async_trait]
pub trait IntentProvider: Send + Sync {
    /// Classify one utterance and return the fulfillment
    async fn detect_intent(&self, request: DetectIntentRequest)
        -> ProviderResult<DetectIntentResponse>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}
