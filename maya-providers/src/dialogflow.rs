//! Dialogflow ES v2 REST client

use async_trait::async_trait;
use maya_core::config::{Credentials, DialogflowConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::{token_source_for, AccessTokenSource};
use crate::base::{
    DetectIntentRequest, DetectIntentResponse, IntentProvider, ProviderError, ProviderResult,
};

const GLOBAL_API_BASE: &str = "https://dialogflow.googleapis.com";

/// Resource name of a conversation, as the API expects it
pub fn session_path(project_id: &str, location: Option<&str>, session_id: &str) -> String {
    match location {
        Some(location) => format!(
            "projects/{}/locations/{}/agent/sessions/{}",
            project_id, location, session_id
        ),
        None => format!("projects/{}/agent/sessions/{}", project_id, session_id),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentBody<'a> {
    query_input: QueryInput<'a>,
}

#[derive(Debug, Serialize)]
struct QueryInput<'a> {
    text: TextInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextInput<'a> {
    text: &'a str,
    language_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentReply {
    #[serde(default)]
    response_id: String,
    query_result: Option<QueryResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResult {
    #[serde(default)]
    fulfillment_text: String,
    #[serde(default)]
    intent: Option<Intent>,
    #[serde(default)]
    intent_detection_confidence: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Intent {
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Dialogflow detect-intent client
pub struct DialogflowClient {
    client: Client,
    api_base: String,
    project_id: String,
    location: Option<String>,
    tokens: Arc<dyn AccessTokenSource>,
}

impl DialogflowClient {
    /// Create a new client for `project_id`.
    ///
    /// `api_base` defaults to the global endpoint, or the regional one when a
    /// location is given.
    pub fn new(
        project_id: impl Into<String>,
        location: Option<String>,
        api_base: Option<String>,
        tokens: Arc<dyn AccessTokenSource>,
        client: Client,
    ) -> Self {
        let api_base = api_base
            .map(|base| base.trim().trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| match &location {
                Some(location) => format!("https://{}-dialogflow.googleapis.com", location),
                None => GLOBAL_API_BASE.to_string(),
            });

        Self {
            client,
            api_base,
            project_id: project_id.into(),
            location,
            tokens,
        }
    }

    /// Build a client from configuration and the credentials loaded at startup
    pub fn from_config(
        config: &DialogflowConfig,
        credentials: &Credentials,
    ) -> ProviderResult<Self> {
        let client = Client::builder().build()?;
        let tokens = token_source_for(credentials, client.clone())?;
        let dialogflow = Self::new(
            credentials.project_id.clone(),
            config.location.clone(),
            config.api_base.clone(),
            tokens,
            client,
        );
        info!(
            project_id = %dialogflow.project_id(),
            api_base = %dialogflow.api_base(),
            "Dialogflow client ready"
        );
        Ok(dialogflow)
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn detect_intent_url(&self, session_id: &str) -> String {
        format!(
            "{}/v2/{}:detectIntent",
            self.api_base,
            session_path(&self.project_id, self.location.as_deref(), session_id)
        )
    }
}

#[async_trait]
impl IntentProvider for DialogflowClient {
    async fn detect_intent(
        &self,
        request: DetectIntentRequest,
    ) -> ProviderResult<DetectIntentResponse> {
        let url = self.detect_intent_url(&request.session_id);
        let token = self.tokens.access_token().await?;
        let body = DetectIntentBody {
            query_input: QueryInput {
                text: TextInput {
                    text: &request.text,
                    language_code: &request.language_code,
                },
            },
        };

        debug!(url = %url, language = %request.language_code, "Sending detectIntent");
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| {
                    if envelope.error.status.is_empty() {
                        envelope.error.message
                    } else {
                        format!("{}: {}", envelope.error.status, envelope.error.message)
                    }
                })
                .unwrap_or(text);
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let reply: DetectIntentReply = serde_json::from_str(&text)?;
        let result = reply.query_result.ok_or_else(|| {
            ProviderError::InvalidResponse("detectIntent response has no queryResult".to_string())
        })?;

        let intent = result
            .intent
            .map(|intent| intent.display_name)
            .filter(|name| !name.is_empty());
        info!(
            intent = intent.as_deref().unwrap_or("<none>"),
            confidence = result.intent_detection_confidence.unwrap_or_default(),
            "Intent detected"
        );

        Ok(DetectIntentResponse {
            response_id: reply.response_id,
            fulfillment_text: result.fulfillment_text,
            intent,
            confidence: result.intent_detection_confidence,
        })
    }

    fn name(&self) -> &str {
        "dialogflow"
    }
}
