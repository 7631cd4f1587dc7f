//! Application state management.
//!
//! Holds the collaborators every handler needs. All fields are `Arc`s or
//! cheap clones, so the state itself is cheap to clone per router.

use database::firestore::{DocumentStore, GoogleCredentials, connect_with_retry};
use domain_ledger::LedgerConfig;
use domain_users::{FirebaseIdentityProvider, IdentityProvider};
use email::{NotificationService, SmtpProvider, TemplateEngine};
use eyre::WrapErr;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;

/// Project id used against emulators when none is configured
const EMULATOR_PROJECT: &str = "demo-gateway";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Firestore, or any other document store in tests
    pub store: Arc<dyn DocumentStore>,
    /// Identity Toolkit client
    pub identity: Arc<dyn IdentityProvider>,
    /// Password reset mail
    pub notifications: NotificationService,
    pub ledger: LedgerConfig,
}

impl AppState {
    /// Resolve credentials, check Firestore connectivity and build the
    /// identity and email clients.
    pub async fn connect(config: &Config, http: reqwest::Client) -> eyre::Result<Self> {
        let credentials = resolve_credentials(config, http.clone())?;
        info!(
            project = %credentials.project_id,
            emulators = config.uses_emulators(),
            "Resolved Google credentials"
        );

        let firestore_config = config
            .firestore
            .clone()
            .with_project_id(credentials.project_id.clone());
        let store = connect_with_retry(&firestore_config, &credentials, http.clone(), None)
            .await
            .wrap_err("Firestore connection failed")?;

        Self::assemble(config, &credentials, Arc::new(store), http)
    }

    /// Build the identity and email clients around a connected store.
    pub fn assemble(
        config: &Config,
        credentials: &GoogleCredentials,
        store: Arc<dyn DocumentStore>,
        http: reqwest::Client,
    ) -> eyre::Result<Self> {
        let identity = FirebaseIdentityProvider::new(
            config
                .identity
                .clone()
                .with_project_id(credentials.project_id.clone()),
            Arc::clone(&credentials.tokens),
            http,
        );

        let smtp = SmtpProvider::new(config.smtp.clone())?;
        let notifications = NotificationService::new(
            Arc::new(smtp),
            TemplateEngine::new()?,
            config.notifications.clone(),
        );

        Ok(Self {
            store,
            identity: Arc::new(identity),
            notifications,
            ledger: config.ledger.clone(),
        })
    }
}

/// A service-account key when one is configured, otherwise the emulator
/// `owner` token.
///
/// `FIREBASE_PROJECT_ID` overrides the project recorded in the key.
pub fn resolve_credentials(
    config: &Config,
    http: reqwest::Client,
) -> eyre::Result<GoogleCredentials> {
    let project_override =
        Some(config.firestore.project_id.clone()).filter(|project| !project.is_empty());

    match &config.credentials_path {
        Some(path) => GoogleCredentials::from_service_account_file(path, project_override, http)
            .wrap_err_with(|| format!("Failed to load service-account key from {}", path)),
        None if config.uses_emulators() => Ok(GoogleCredentials::emulator(
            project_override.unwrap_or_else(|| EMULATOR_PROJECT.to_string()),
        )),
        None => Err(eyre::eyre!(
            "no service-account key configured and no emulator host set"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::{Environment, app_info, server::ServerConfig};
    use database::firestore::{FirestoreConfig, InMemoryDocumentStore};
    use domain_users::IdentityConfig;
    use email::{NotificationServiceConfig, SmtpConfig, TlsMode};

    fn config(project: &str, emulator: bool, key: Option<&str>) -> Config {
        let mut firestore = FirestoreConfig::new(project);
        if emulator {
            firestore = firestore.with_emulator_host("localhost:8081");
        }
        Config {
            app: app_info!(),
            server: ServerConfig::default(),
            firestore,
            identity: IdentityConfig::new(project, "web-key"),
            smtp: SmtpConfig {
                host: "localhost".to_string(),
                port: 1025,
                username: String::new(),
                password: String::new(),
                from_email: "noreply@example.com".to_string(),
                from_name: "Gateway".to_string(),
                tls: TlsMode::None,
            },
            notifications: NotificationServiceConfig::default(),
            ledger: LedgerConfig::default(),
            credentials_path: key.map(str::to_string),
            environment: Environment::Development,
        }
    }

    #[test]
    fn test_emulator_credentials_use_configured_project() {
        let credentials =
            resolve_credentials(&config("gatewayutsav-921d6", true, None), reqwest::Client::new())
                .unwrap();
        assert_eq!(credentials.project_id, "gatewayutsav-921d6");
    }

    #[test]
    fn test_emulator_credentials_fall_back_to_demo_project() {
        let credentials =
            resolve_credentials(&config("", true, None), reqwest::Client::new()).unwrap();
        assert_eq!(credentials.project_id, EMULATOR_PROJECT);
    }

    #[test]
    fn test_missing_key_file_is_reported() {
        let err = resolve_credentials(
            &config("p", false, Some("/nonexistent/key.json")),
            reqwest::Client::new(),
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/key.json"));
    }

    #[test]
    fn test_no_credentials_without_emulators() {
        assert!(resolve_credentials(&config("p", false, None), reqwest::Client::new()).is_err());
    }

    #[tokio::test]
    async fn test_assemble_wires_collaborators() {
        let config = config("demo-gateway", true, None);
        let credentials = resolve_credentials(&config, reqwest::Client::new()).unwrap();
        let store = InMemoryDocumentStore::new();
        let profile = test_utils::doc(serde_json::json!({"email": "asha@example.com"}));
        store.set("Users", "u1", profile).await.unwrap();

        let state = AppState::assemble(
            &config,
            &credentials,
            Arc::new(store),
            reqwest::Client::new(),
        )
        .unwrap();

        assert_eq!(state.store.list("Users").await.unwrap().len(), 1);
        assert_eq!(
            state.ledger.join_concurrency,
            LedgerConfig::default().join_concurrency
        );
    }

    #[tokio::test]
    async fn test_connect_fails_when_firestore_is_unreachable() {
        let mut config = config("demo-gateway", false, None);
        config.firestore = FirestoreConfig::new("demo-gateway").with_emulator_host("127.0.0.1:1");

        let err = AppState::connect(&config, reqwest::Client::new())
            .await
            .err()
            .unwrap();
        assert!(format!("{:#}", err).contains("Firestore connection failed"));
    }
}
