//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reply shown when the intent service cannot be reached
pub const DEFAULT_FALLBACK_REPLY: &str = "Sorry, I'm having trouble connecting right now.";

/// Root configuration for maya-chat
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Intent service configuration
    #[serde(default)]
    pub dialogflow: DialogflowConfig,
    /// Chat front-end configuration
    #[serde(default)]
    pub chat: ChatConfig,
    /// Web server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}

/// Dialogflow (intent detection) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogflowConfig {
    /// Google Cloud project id; defaults to the service account's project
    #[serde(default)]
    pub project_id: String,
    /// Default language code sent with every query
    #[serde(default = "default_language_code")]
    pub language_code: String,
    /// Regional agent location (e.g. "europe-west2"); global when unset
    #[serde(default)]
    pub location: Option<String>,
    /// Override for the REST endpoint root
    #[serde(default)]
    pub api_base: Option<String>,
    /// Inline service account key
    #[serde(default)]
    pub credentials: Option<ServiceAccountKey>,
    /// Path to a service account key file
    #[serde(default)]
    pub credentials_file: Option<String>,
    /// Pre-issued OAuth access token, used instead of a service account
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_language_code() -> String {
    "en-US".to_string()
}

impl Default for DialogflowConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            language_code: default_language_code(),
            location: None,
            api_base: None,
            credentials: None,
            credentials_file: None,
            access_token: None,
        }
    }
}

/// Google service account key, as downloaded from the Cloud console
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceAccountKey {
    #[serde(default, rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

// Keeps the private key out of logs and panics.
impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

/// Chat front-end configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    /// First assistant turn of every session
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// Reply used when the intent service fails
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
    /// Maximum number of live browser sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Idle sessions older than this are dropped when a new one is created
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

fn default_title() -> String {
    "Maya Chatbot".to_string()
}
fn default_subtitle() -> String {
    "I'm live! Ask me anything.".to_string()
}
fn default_greeting() -> String {
    "Hey there! What's on your mind?".to_string()
}
fn default_placeholder() -> String {
    "Talk to Maya...".to_string()
}
fn default_fallback_reply() -> String {
    DEFAULT_FALLBACK_REPLY.to_string()
}
fn default_max_sessions() -> usize {
    1000
}
fn default_session_ttl_secs() -> u64 {
    3600
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
            greeting: default_greeting(),
            placeholder: default_placeholder(),
            fallback_reply: default_fallback_reply(),
            max_sessions: default_max_sessions(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8501
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
