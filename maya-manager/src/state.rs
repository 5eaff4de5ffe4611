use maya_core::config::ChatConfig;
use maya_core::session::SessionManager;
use maya_core::Bootstrap;
use maya_providers::{DialogflowClient, IntentClient, ProviderResult};
use std::sync::Arc;
use std::time::Duration;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub client: IntentClient,
    pub chat: Arc<ChatConfig>,
    pub project_id: String,
}

impl AppState {
    pub fn new(client: IntentClient, chat: ChatConfig, project_id: impl Into<String>) -> Self {
        let sessions = Arc::new(
            SessionManager::new(chat.greeting.clone(), chat.max_sessions)
                .with_idle_ttl(Duration::from_secs(chat.session_ttl_secs)),
        );
        Self {
            sessions,
            client,
            chat: Arc::new(chat),
            project_id: project_id.into(),
        }
    }

    /// Wire the Dialogflow client to the loaded configuration and credentials
    pub fn from_bootstrap(boot: &Bootstrap) -> ProviderResult<Self> {
        let provider = DialogflowClient::from_config(&boot.config.dialogflow, &boot.credentials)?;
        let project_id = provider.project_id().to_string();
        Ok(Self::new(
            wrap_provider(provider, boot),
            boot.config.chat.clone(),
            project_id,
        ))
    }
}

/// Build the fallback-converting client for the configured agent
pub fn intent_client(boot: &Bootstrap) -> ProviderResult<IntentClient> {
    let provider = DialogflowClient::from_config(&boot.config.dialogflow, &boot.credentials)?;
    Ok(wrap_provider(provider, boot))
}

fn wrap_provider(provider: DialogflowClient, boot: &Bootstrap) -> IntentClient {
    IntentClient::new(Arc::new(provider))
        .with_language(boot.config.dialogflow.language_code.clone())
        .with_fallback_reply(boot.config.chat.fallback_reply.clone())
}
