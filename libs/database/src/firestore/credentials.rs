//! OAuth2 access tokens for Google REST APIs.
//!
//! A service-account key signs a short-lived RS256 JWT which is exchanged at
//! the key's `token_uri` for a bearer token. Tokens are cached and refreshed
//! shortly before they expire. Emulators accept a fixed `owner` token instead.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::common::{DatabaseError, DatabaseResult};

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// Token used by the Firestore and Auth emulators
pub const EMULATOR_TOKEN: &str = "owner";

/// Supplies bearer tokens for outgoing requests
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> DatabaseResult<String>;
}

/// The fields of a service-account JSON key that token exchange needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
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

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> DatabaseResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| DatabaseError::Credentials(format!("invalid service-account key: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> DatabaseResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DatabaseError::Credentials(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Exchanges signed service-account assertions for access tokens
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    http: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> DatabaseResult<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| DatabaseError::Credentials(format!("invalid private key: {e}")))?;

        Ok(Self {
            key,
            signing_key,
            http,
            cached: RwLock::new(None),
        })
    }

    fn assertion(&self, now: DateTime<Utc>) -> DatabaseResult<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let claims = Claims {
            iss: &self.key.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&header, &claims, &self.signing_key)
            .map_err(|e| DatabaseError::Credentials(format!("failed to sign assertion: {e}")))
    }

    async fn fetch(&self) -> DatabaseResult<CachedToken> {
        let now = Utc::now();
        let assertion = self.assertion(now)?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DatabaseError::Credentials(format!(
                "token exchange failed ({status}): {body}"
            )));
        }

        let token: TokenResponse = response.json().await?;
        debug!(expires_in = token.expires_in, "Obtained service-account access token");

        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> DatabaseResult<String> {
        if let Some(cached) = self.cached.read().await.as_ref()
            && cached.is_fresh(Utc::now())
        {
            return Ok(cached.token.clone());
        }

        let mut slot = self.cached.write().await;
        // Another task may have refreshed while we waited for the write lock
        if let Some(cached) = slot.as_ref()
            && cached.is_fresh(Utc::now())
        {
            return Ok(cached.token.clone());
        }

        let fresh = self.fetch().await?;
        let token = fresh.token.clone();
        *slot = Some(fresh);
        Ok(token)
    }
}

/// A fixed bearer token, used against local emulators
#[derive(Debug, Clone)]
pub struct StaticTokenSource(String);

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> DatabaseResult<String> {
        Ok(self.0.clone())
    }
}

/// Project id plus a token source, shared by the Firestore and Identity clients
#[derive(Clone)]
pub struct GoogleCredentials {
    pub project_id: String,
    pub tokens: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCredentials")
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl GoogleCredentials {
    /// Load a service-account key. `project_id` overrides the key's project.
    pub fn from_service_account_file(
        path: impl AsRef<Path>,
        project_id: Option<String>,
        http: reqwest::Client,
    ) -> DatabaseResult<Self> {
        let key = ServiceAccountKey::from_file(path)?;
        let project_id = project_id.unwrap_or_else(|| key.project_id.clone());
        let tokens = ServiceAccountTokenSource::new(key, http)?;

        Ok(Self {
            project_id,
            tokens: Arc::new(tokens),
        })
    }

    /// Credentials accepted by the local emulators
    pub fn emulator(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            tokens: Arc::new(StaticTokenSource::new(EMULATOR_TOKEN)),
        }
    }
}
