//! Fake intent providers for handler and exchange tests

use async_trait::async_trait;
use maya_providers::{
    DetectIntentRequest, DetectIntentResponse, IntentProvider, ProviderError, ProviderResult,
};
use std::sync::Mutex;
use tokio::sync::Notify;

/// Answers every utterance with a fixed reply or a fixed error
pub struct EchoProvider {
    reply: Result<String, String>,
    seen: Mutex<Vec<DetectIntentRequest>>,
}

impl EchoProvider {
    pub fn ok(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<DetectIntentRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl IntentProvider for EchoProvider {
    async fn detect_intent(
        &self,
        request: DetectIntentRequest,
    ) -> ProviderResult<DetectIntentResponse> {
        self.seen.lock().unwrap().push(request);
        match &self.reply {
            Ok(text) => Ok(DetectIntentResponse {
                fulfillment_text: text.clone(),
                ..Default::default()
            }),
            Err(message) => Err(ProviderError::ApiError {
                status: 503,
                message: message.clone(),
            }),
        }
    }

    fn name(&self) -> &str {
        "echo"
    }
}

/// Holds every call until `release` is notified
#[derive(Default)]
pub struct GatedProvider {
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl IntentProvider for GatedProvider {
    async fn detect_intent(
        &self,
        request: DetectIntentRequest,
    ) -> ProviderResult<DetectIntentResponse> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(DetectIntentResponse {
            fulfillment_text: format!("re: {}", request.text),
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "gated"
    }
}
