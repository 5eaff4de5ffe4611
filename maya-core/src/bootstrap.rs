//! Process startup: configuration plus credentials, checked once at entry.

use crate::config::{load_credentials, Config, Credentials};
use std::path::Path;
use tracing::info;

/// Everything a front-end needs to start serving chats
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub config: Config,
    pub credentials: Credentials,
}

/// Resolve credentials for an already loaded configuration.
///
/// A missing credential is [`crate::Error::CredentialsMissing`]; callers treat
/// any error here as fatal and halt before rendering anything. Callers set up
/// logging from `config` first so the outcome is recorded.
pub fn bootstrap(config: Config, secrets_path: &Path) -> crate::Result<Bootstrap> {
    let credentials = load_credentials(&config.dialogflow, secrets_path)?;
    info!(
        project_id = %credentials.project_id,
        source = %credentials.source,
        "Credentials loaded"
    );
    Ok(Bootstrap {
        config,
        credentials,
    })
}
