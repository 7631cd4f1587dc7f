use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or_default, env_required};
use database::firestore::TokenSource;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{IdentityError, IdentityProvider, IdentityResult};

const PRODUCTION_HOST: &str = "https://identitytoolkit.googleapis.com";

/// Identity Toolkit settings
#[derive(Clone)]
pub struct IdentityConfig {
    pub project_id: String,
    /// Web API key for the password grant
    pub api_key: String,
    /// `host:port` of the Auth emulator
    pub emulator_host: Option<String>,
    /// Where the reset link sends the user after the code is applied
    pub reset_continue_url: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .field("emulator_host", &self.emulator_host)
            .field("reset_continue_url", &self.reset_continue_url)
            .finish()
    }
}

impl IdentityConfig {
    pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: api_key.into(),
            emulator_host: None,
            reset_continue_url: "https://gatewayutsav-921d6.firebaseapp.com/__/auth/".to_string(),
            timeout_secs: 30,
        }
    }

    pub fn with_emulator_host(mut self, host: impl Into<String>) -> Self {
        self.emulator_host = Some(host.into());
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    pub fn with_reset_continue_url(mut self, url: impl Into<String>) -> Self {
        self.reset_continue_url = url.into();
        self
    }

    pub fn is_emulator(&self) -> bool {
        self.emulator_host.is_some()
    }

    fn base_url(&self) -> String {
        match &self.emulator_host {
            Some(host) => format!("http://{}/identitytoolkit.googleapis.com", host),
            None => PRODUCTION_HOST.to_string(),
        }
    }

    /// Admin endpoint scoped to the project, e.g. `accounts:delete`
    fn admin_url(&self, action: &str) -> String {
        format!(
            "{}/v1/projects/{}/{}",
            self.base_url(),
            self.project_id,
            action
        )
    }

    fn sign_in_url(&self) -> String {
        format!(
            "{}/v1/accounts:signInWithPassword?key={}",
            self.base_url(),
            urlencoding::encode(&self.api_key)
        )
    }
}

impl FromEnv for IdentityConfig {
    /// `API_KEY` is required; `FIREBASE_PROJECT_ID` may be left empty and
    /// filled from the service-account key later.
    fn from_env() -> Result<Self, ConfigError> {
        let emulator_host = std::env::var("FIREBASE_AUTH_EMULATOR_HOST")
            .ok()
            .filter(|host| !host.is_empty());

        let mut config = Self::new(
            env_or_default("FIREBASE_PROJECT_ID", ""),
            env_required("API_KEY")?,
        );
        config.emulator_host = emulator_host;
        config.reset_continue_url = env_or_default(
            "RESET_CONTINUE_URL",
            "https://gatewayutsav-921d6.firebaseapp.com/__/auth/",
        );
        config.timeout_secs = env_parse_or_default("IDENTITY_TIMEOUT_SECS", "30")?;
        Ok(config)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OobResponse {
    oob_link: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// [`IdentityProvider`] backed by the Identity Toolkit REST v1 API
///
/// Admin calls (create, delete, reset links) authenticate with the
/// service-account token; sign-in uses the web API key like a client would.
#[derive(Clone)]
pub struct FirebaseIdentityProvider {
    http: reqwest::Client,
    config: IdentityConfig,
    tokens: Arc<dyn TokenSource>,
}

impl FirebaseIdentityProvider {
    pub fn new(config: IdentityConfig, tokens: Arc<dyn TokenSource>, http: reqwest::Client) -> Self {
        Self {
            http,
            config,
            tokens,
        }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    async fn admin_post<T: DeserializeOwned>(&self, action: &str, body: Value) -> IdentityResult<T> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| IdentityError::Credentials(e.to_string()))?;

        let response = self
            .http
            .post(self.config.admin_url(action))
            .bearer_auth(token)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&body)
            .send()
            .await?;

        parse_response(response).await
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> IdentityResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(rejection(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| IdentityError::InvalidResponse(e.to_string()))
}

/// Map an error body to [`IdentityError`]; messages look like
/// `WEAK_PASSWORD : Password should be at least 6 characters`
fn rejection(status: StatusCode, body: &str) -> IdentityError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| format!("Identity API returned {}", status.as_u16()));

    if message.starts_with("USER_NOT_FOUND") {
        IdentityError::UserNotFound
    } else {
        IdentityError::Rejected(message)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    #[instrument(skip(self, password))]
    async fn create_user(&self, email: &str, password: &str) -> IdentityResult<String> {
        let created: AccountResponse = self
            .admin_post("accounts", json!({ "email": email, "password": password }))
            .await?;
        debug!(uid = %created.local_id, "Created identity");
        Ok(created.local_id)
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> IdentityResult<String> {
        let response = self
            .http
            .post(self.config.sign_in_url())
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true
            }))
            .send()
            .await?;

        let account: AccountResponse = parse_response(response).await?;
        Ok(account.local_id)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, uid: &str) -> IdentityResult<()> {
        let _: Value = self
            .admin_post("accounts:delete", json!({ "localId": uid }))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn password_reset_link(&self, email: &str) -> IdentityResult<String> {
        let oob: OobResponse = self
            .admin_post(
                "accounts:sendOobCode",
                json!({
                    "requestType": "PASSWORD_RESET",
                    "email": email,
                    "returnOobLink": true,
                    "continueUrl": self.config.reset_continue_url,
                    "canHandleCodeInApp": true
                }),
            )
            .await?;
        Ok(oob.oob_link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, http::StatusCode as AxumStatus, routing::post};
    use database::firestore::StaticTokenSource;
    use std::collections::HashMap;

    #[test]
    fn test_urls() {
        let prod = IdentityConfig::new("gatewayutsav-921d6", "web-key");
        assert_eq!(
            prod.admin_url("accounts:delete"),
            "https://identitytoolkit.googleapis.com/v1/projects/gatewayutsav-921d6/accounts:delete"
        );
        assert_eq!(
            prod.sign_in_url(),
            "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword?key=web-key"
        );

        let emulated = prod.with_emulator_host("localhost:9099");
        assert!(emulated.is_emulator());
        assert_eq!(
            emulated.admin_url("accounts"),
            "http://localhost:9099/identitytoolkit.googleapis.com/v1/projects/gatewayutsav-921d6/accounts"
        );
    }

    #[test]
    fn test_rejection_parsing() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_EXISTS"}}"#;
        assert!(matches!(
            rejection(StatusCode::BAD_REQUEST, body),
            IdentityError::Rejected(m) if m == "EMAIL_EXISTS"
        ));

        let missing = r#"{"error":{"code":400,"message":"USER_NOT_FOUND"}}"#;
        assert!(matches!(
            rejection(StatusCode::BAD_REQUEST, missing),
            IdentityError::UserNotFound
        ));

        assert!(matches!(
            rejection(StatusCode::BAD_GATEWAY, "<html>"),
            IdentityError::Rejected(m) if m.contains("502")
        ));
    }

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("API_KEY", Some("web-key")),
                ("FIREBASE_PROJECT_ID", Some("demo-gateway")),
                ("FIREBASE_AUTH_EMULATOR_HOST", Some("127.0.0.1:9099")),
                ("RESET_CONTINUE_URL", None),
                ("IDENTITY_TIMEOUT_SECS", None),
            ],
            || {
                let config = IdentityConfig::from_env().unwrap();
                assert_eq!(config.project_id, "demo-gateway");
                assert_eq!(config.emulator_host.as_deref(), Some("127.0.0.1:9099"));
                assert_eq!(
                    config.reset_continue_url,
                    "https://gatewayutsav-921d6.firebaseapp.com/__/auth/"
                );
                assert!(!format!("{:?}", config).contains("web-key"));
            },
        );
    }

    #[test]
    fn test_from_env_requires_api_key() {
        temp_env::with_var("API_KEY", None::<&str>, || {
            assert!(matches!(
                IdentityConfig::from_env(),
                Err(ConfigError::MissingEnvVar(_))
            ));
        });
    }

    /// Minimal stand-in for the Auth emulator's REST surface
    async fn fake_emulator() -> String {
        async fn create(Json(body): Json<Value>) -> (AxumStatus, Json<Value>) {
            if body["email"] == "taken@example.com" {
                return (
                    AxumStatus::BAD_REQUEST,
                    Json(json!({"error": {"code": 400, "message": "EMAIL_EXISTS"}})),
                );
            }
            (AxumStatus::OK, Json(json!({"localId": "emu-uid-1"})))
        }

        async fn sign_in(
            Query(params): Query<HashMap<String, String>>,
            Json(body): Json<Value>,
        ) -> (AxumStatus, Json<Value>) {
            if params.get("key").map(String::as_str) == Some("web-key")
                && body["password"] == "right"
            {
                (AxumStatus::OK, Json(json!({"localId": "emu-uid-1", "idToken": "t"})))
            } else {
                (
                    AxumStatus::BAD_REQUEST,
                    Json(json!({"error": {"code": 400, "message": "INVALID_LOGIN_CREDENTIALS"}})),
                )
            }
        }

        async fn oob(Json(body): Json<Value>) -> Json<Value> {
            Json(json!({
                "email": body["email"],
                "oobLink": format!("{}?mode=resetPassword&oobCode=code1", body["continueUrl"].as_str().unwrap_or_default())
            }))
        }

        let app = Router::new()
            .route(
                "/identitytoolkit.googleapis.com/v1/projects/demo/accounts",
                post(create),
            )
            .route(
                "/identitytoolkit.googleapis.com/v1/projects/demo/accounts:sendOobCode",
                post(oob),
            )
            .route(
                "/identitytoolkit.googleapis.com/v1/accounts:signInWithPassword",
                post(sign_in),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr.to_string()
    }

    async fn provider() -> FirebaseIdentityProvider {
        let host = fake_emulator().await;
        FirebaseIdentityProvider::new(
            IdentityConfig::new("demo", "web-key")
                .with_emulator_host(host)
                .with_reset_continue_url("http://localhost/after-reset"),
            Arc::new(StaticTokenSource::new("owner")),
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn test_create_user_against_emulator() {
        let provider = provider().await;

        assert_eq!(
            provider.create_user("new@example.com", "secret1").await.unwrap(),
            "emu-uid-1"
        );
        assert!(matches!(
            provider.create_user("taken@example.com", "secret1").await,
            Err(IdentityError::Rejected(m)) if m == "EMAIL_EXISTS"
        ));
    }

    #[tokio::test]
    async fn test_sign_in_against_emulator() {
        let provider = provider().await;

        assert_eq!(
            provider
                .sign_in_with_password("a@example.com", "right")
                .await
                .unwrap(),
            "emu-uid-1"
        );
        assert!(matches!(
            provider.sign_in_with_password("a@example.com", "wrong").await,
            Err(IdentityError::Rejected(m)) if m == "INVALID_LOGIN_CREDENTIALS"
        ));
    }

    #[tokio::test]
    async fn test_reset_link_uses_continue_url() {
        let provider = provider().await;

        let link = provider.password_reset_link("a@example.com").await.unwrap();
        assert_eq!(
            link,
            "http://localhost/after-reset?mode=resetPassword&oobCode=code1"
        );
    }
}
