//! Fallback-converting front door to an intent provider

use maya_core::config::DEFAULT_FALLBACK_REPLY;
use std::sync::Arc;
use tracing::warn;

use crate::base::{DetectIntentRequest, IntentProvider};

/// What the front-end shows for one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentReply {
    /// Fulfillment text, or the fallback reply when the call failed
    pub text: String,
    /// Non-fatal error detail to surface next to the reply
    pub notice: Option<String>,
}

/// Sends utterances to a provider and never fails.
///
/// Every transport or remote error is logged, reported as a notice, and
/// replaced by the fixed fallback reply. No retries.
#[derive(Clone)]
pub struct IntentClient {
    provider: Arc<dyn IntentProvider>,
    language_code: String,
    fallback_reply: String,
}

impl IntentClient {
    /// Create a client with the default language (en-US) and fallback reply
    pub fn new(provider: Arc<dyn IntentProvider>) -> Self {
        Self {
            provider,
            language_code: "en-US".to_string(),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
        }
    }

    pub fn with_language(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = language_code.into();
        self
    }

    pub fn with_fallback_reply(mut self, fallback_reply: impl Into<String>) -> Self {
        self.fallback_reply = fallback_reply.into();
        self
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    /// Send `text` in the default language
    pub async fn send(&self, session_id: &str, text: &str) -> IntentReply {
        self.send_in_language(session_id, text, &self.language_code)
            .await
    }

    /// Send `text` with an explicit language code
    pub async fn send_in_language(
        &self,
        session_id: &str,
        text: &str,
        language_code: &str,
    ) -> IntentReply {
        let request = DetectIntentRequest::new(session_id, text, language_code);
        match self.provider.detect_intent(request).await {
            Ok(response) => IntentReply {
                text: response.fulfillment_text,
                notice: None,
            },
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    session_id = %session_id,
                    error = %e,
                    "Intent request failed, using fallback reply"
                );
                IntentReply {
                    text: self.fallback_reply.clone(),
                    notice: Some(format!(
                        "Error communicating with {}: {}",
                        self.provider.name(),
                        e
                    )),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{DetectIntentResponse, ProviderError, ProviderResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedProvider {
        reply: Result<String, String>,
        seen: Mutex<Vec<DetectIntentRequest>>,
    }

    impl FixedProvider {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl IntentProvider for FixedProvider {
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
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_send_returns_fulfillment_text() {
        let client = IntentClient::new(Arc::new(FixedProvider::ok("Hi there!")));
        let reply = client.send("s-1", "hello").await;

        assert_eq!(reply.text, "Hi there!");
        assert!(reply.notice.is_none());
    }

    #[tokio::test]
    async fn test_send_uses_default_language_and_session() {
        let provider = Arc::new(FixedProvider::ok("ok"));
        let client = IntentClient::new(provider.clone());
        client.send("s-1", "hello").await;

        let seen = provider.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], DetectIntentRequest::new("s-1", "hello", "en-US"));
    }

    #[tokio::test]
    async fn test_send_in_language_overrides_default() {
        let provider = Arc::new(FixedProvider::ok("ok"));
        let client = IntentClient::new(provider.clone()).with_language("fr-FR");
        client.send_in_language("s-1", "bonjour", "fr-CA").await;
        client.send("s-1", "salut").await;

        let seen = provider.seen.lock().unwrap().clone();
        assert_eq!(seen[0].language_code, "fr-CA");
        assert_eq!(seen[1].language_code, "fr-FR");
    }

    #[tokio::test]
    async fn test_failure_becomes_exact_fallback() {
        let client = IntentClient::new(Arc::new(FixedProvider::failing("backend down")));
        let reply = client.send("s-1", "hello").await;

        assert_eq!(reply.text, "Sorry, I'm having trouble connecting right now.");
        let notice = reply.notice.unwrap();
        assert!(notice.contains("backend down"));
        assert!(notice.starts_with("Error communicating with fixed"));
    }

    #[tokio::test]
    async fn test_custom_fallback_reply() {
        let client = IntentClient::new(Arc::new(FixedProvider::failing("x")))
            .with_fallback_reply("Back soon!");
        assert_eq!(client.send("s-1", "hello").await.text, "Back soon!");
    }

    #[tokio::test]
    async fn test_empty_fulfillment_passed_through() {
        let client = IntentClient::new(Arc::new(FixedProvider::ok("")));
        let reply = client.send("s-1", "hello").await;

        assert_eq!(reply.text, "");
        assert!(reply.notice.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_fallback() {
        use crate::auth::StaticTokenSource;
        use crate::dialogflow::DialogflowClient;

        // Nothing listens on the discard port.
        let provider = DialogflowClient::new(
            "maya-test",
            None,
            Some("http://127.0.0.1:9".to_string()),
            Arc::new(StaticTokenSource::new("ya29.test")),
            reqwest::Client::new(),
        );
        let client = IntentClient::new(Arc::new(provider));
        let reply = client.send("s-1", "hello").await;

        assert_eq!(reply.text, "Sorry, I'm having trouble connecting right now.");
        assert!(reply
            .notice
            .unwrap()
            .starts_with("Error communicating with dialogflow"));
    }
}
