use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

use super::error::VisionServiceError;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields we need from a downloaded service-account JSON key.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read service-account key {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid service-account key {}", path.display()))
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Exchanges a signed service-account assertion for an OAuth bearer token and
/// reuses it until shortly before it expires.
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    scope: String,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(key: ServiceAccountKey, scope: impl Into<String>) -> Self {
        Self {
            key,
            scope: scope.into(),
            client: reqwest::Client::new(),
            cached: Mutex::new(None),
        }
    }

    pub async fn access_token(&self) -> Result<String, VisionServiceError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(60) > Utc::now() {
                return Ok(token.value.clone());
            }
        }

        let now = Utc::now();
        let assertion = self.assertion(now)?;
        log::debug!("🔑 Requesting access token for {}", self.key.client_email);

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionServiceError::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: now + Duration::seconds(token.expires_in),
        });

        Ok(token.access_token)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, VisionServiceError> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| VisionServiceError::Auth(format!("bad private key: {}", e)))?;

        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| VisionServiceError::Auth(format!("cannot sign assertion: {}", e)))
    }
}
