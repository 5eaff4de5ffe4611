//! Google credential resolution
//!
//! Credentials are looked up once at startup, in order: a pre-issued access
//! token, an inline service account key, a key file, and finally the
//! `[google_credentials]` table of `secrets.toml` in the config directory.

use super::schema::{DialogflowConfig, ServiceAccountKey};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the credentials were found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    AccessToken,
    Inline,
    File(PathBuf),
    Secrets(PathBuf),
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::AccessToken => write!(f, "access token"),
            CredentialSource::Inline => write!(f, "config.json (dialogflow.credentials)"),
            CredentialSource::File(path) => write!(f, "key file {}", path.display()),
            CredentialSource::Secrets(path) => write!(f, "{} [google_credentials]", path.display()),
        }
    }
}

/// Secret material used to authenticate against the intent service
#[derive(Clone)]
pub enum Secret {
    ServiceAccount(ServiceAccountKey),
    AccessToken(String),
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Secret::ServiceAccount(key) => f.debug_tuple("ServiceAccount").field(key).finish(),
            Secret::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
        }
    }
}

/// Resolved credentials plus the project they belong to
#[derive(Debug, Clone)]
pub struct Credentials {
    pub project_id: String,
    pub secret: Secret,
    pub source: CredentialSource,
}

/// Resolve credentials from the Dialogflow config and the secrets file.
///
/// Returns [`crate::Error::CredentialsMissing`] when no source is configured.
pub fn load_credentials(config: &DialogflowConfig, secrets_path: &Path) -> crate::Result<Credentials> {
    if let Some(token) = non_empty(config.access_token.as_deref()) {
        let project_id = non_empty(Some(&config.project_id)).ok_or_else(|| {
            crate::Error::Credentials(
                "dialogflow.project_id is required when using an access token".to_string(),
            )
        })?;
        return Ok(Credentials {
            project_id: project_id.to_string(),
            secret: Secret::AccessToken(token.to_string()),
            source: CredentialSource::AccessToken,
        });
    }

    if let Some(key) = &config.credentials {
        return from_key(config, key.clone(), CredentialSource::Inline);
    }

    if let Some(file) = non_empty(config.credentials_file.as_deref()) {
        let path = PathBuf::from(file);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            crate::Error::Credentials(format!("cannot read key file {}: {}", path.display(), e))
        })?;
        let key: ServiceAccountKey = serde_json::from_str(&content).map_err(|e| {
            crate::Error::Credentials(format!("malformed key file {}: {}", path.display(), e))
        })?;
        return from_key(config, key, CredentialSource::File(path));
    }

    if secrets_path.exists() {
        if let Some(key) = read_secrets_table(secrets_path)? {
            return from_key(config, key, CredentialSource::Secrets(secrets_path.to_path_buf()));
        }
        debug!(path = %secrets_path.display(), "secrets file has no [google_credentials] table");
    }

    Err(crate::Error::CredentialsMissing(format!(
        "add a [google_credentials] table to {}, set GOOGLE_APPLICATION_CREDENTIALS, \
         or configure dialogflow.credentials",
        secrets_path.display()
    )))
}

fn read_secrets_table(path: &Path) -> crate::Result<Option<ServiceAccountKey>> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path.to_path_buf()).format(config::FileFormat::Toml))
        .build()?;

    match settings.get::<ServiceAccountKey>("google_credentials") {
        Ok(key) => Ok(Some(key)),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(crate::Error::Credentials(format!(
            "malformed [google_credentials] in {}: {}",
            path.display(),
            e
        ))),
    }
}

fn from_key(
    config: &DialogflowConfig,
    key: ServiceAccountKey,
    source: CredentialSource,
) -> crate::Result<Credentials> {
    if !key.key_type.is_empty() && key.key_type != "service_account" {
        return Err(crate::Error::Credentials(format!(
            "expected a service_account key, got '{}'",
            key.key_type
        )));
    }
    if !key.private_key.contains("PRIVATE KEY") {
        return Err(crate::Error::Credentials(
            "private_key is not a PEM encoded key".to_string(),
        ));
    }

    let project_id = non_empty(Some(&config.project_id))
        .or_else(|| non_empty(Some(&key.project_id)))
        .ok_or_else(|| {
            crate::Error::Credentials("no project id in config or service account key".to_string())
        })?
        .to_string();

    Ok(Credentials {
        project_id,
        secret: Secret::ServiceAccount(key),
        source,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
