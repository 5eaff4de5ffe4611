//! Google OAuth access tokens for the Dialogflow API
//!
//! Service accounts authenticate with a self-signed RS256 JWT that is
//! exchanged at the key's `token_uri` for a short-lived access token. Tokens
//! are cached until shortly before they expire.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use maya_core::config::{Credentials, Secret, ServiceAccountKey};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::base::{ProviderError, ProviderResult};

/// Scopes requested for Dialogflow detect-intent calls
pub const DIALOGFLOW_SCOPES: &str =
    "https://www.googleapis.com/auth/cloud-platform https://www.googleapis.com/auth/dialogflow";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
/// Refresh this long before the cached token expires
const REFRESH_MARGIN_SECS: u64 = 60;

/// Something that can hand out a bearer token
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> ProviderResult<String>;
}

/// A pre-issued token, used as-is
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenSource for StaticTokenSource {
    async fn access_token(&self) -> ProviderResult<String> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    access_token: String,
    expires_at: u64,
}

/// Service-account JWT flow with an in-process token cache
pub struct ServiceAccountTokenSource {
    client: Client,
    client_email: String,
    private_key_id: String,
    token_uri: String,
    scopes: String,
    encoding_key: EncodingKey,
    cache: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    /// Parse the key's PEM once; fails on a malformed private key
    pub fn new(key: &ServiceAccountKey, client: Client) -> ProviderResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            ProviderError::ConfigError(format!("cannot parse service account private key: {}", e))
        })?;

        Ok(Self {
            client,
            client_email: key.client_email.clone(),
            private_key_id: key.private_key_id.clone(),
            token_uri: key.token_uri.clone(),
            scopes: DIALOGFLOW_SCOPES.to_string(),
            encoding_key,
            cache: Mutex::new(None),
        })
    }

    fn signed_assertion(&self, now: u64) -> ProviderResult<String> {
        let claims = JwtClaims {
            iss: self.client_email.clone(),
            scope: self.scopes.clone(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        if !self.private_key_id.is_empty() {
            header.kid = Some(self.private_key_id.clone());
        }

        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| ProviderError::Auth(format!("failed to sign JWT: {}", e)))
    }

    async fn exchange(&self, now: u64) -> ProviderResult<CachedToken> {
        let assertion = self.signed_assertion(now)?;

        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Auth(format!(
                "token exchange failed ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        info!(client_email = %self.client_email, "Access token obtained");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + token.expires_in,
        })
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> ProviderResult<String> {
        // Held across the exchange so concurrent callers share one refresh.
        let mut cache = self.cache.lock().await;
        let now = unix_now();

        if let Some(cached) = cache.as_ref() {
            if now + REFRESH_MARGIN_SECS < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
            debug!("Cached access token expiring, refreshing");
        }

        let fresh = self.exchange(now).await?;
        let token = fresh.access_token.clone();
        *cache = Some(fresh);
        Ok(token)
    }
}

/// Build the token source matching the loaded credentials
pub fn token_source_for(
    credentials: &Credentials,
    client: Client,
) -> ProviderResult<Arc<dyn AccessTokenSource>> {
    match &credentials.secret {
        Secret::AccessToken(token) => Ok(Arc::new(StaticTokenSource::new(token.clone()))),
        Secret::ServiceAccount(key) => Ok(Arc::new(ServiceAccountTokenSource::new(key, client)?)),
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
