#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or_default};

const PRODUCTION_HOST: &str = "https://firestore.googleapis.com";

/// Firestore connection settings
///
/// `project_id` may be left empty when loading from the environment; the
/// caller then fills it from the service-account key.
///
/// # Example
///
/// ```ignore
/// use database::firestore::FirestoreConfig;
///
/// let config = FirestoreConfig::new("my-project")
///     .with_emulator_host("localhost:8081");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FirestoreConfig {
    pub project_id: String,

    /// Database id, `(default)` unless a named database is used
    pub database: String,

    /// `host:port` of a local emulator; plain HTTP when set
    pub emulator_host: Option<String>,

    /// Documents requested per page when scanning a collection
    pub page_size: u32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: "(default)".to_string(),
            emulator_host: None,
            page_size: 300,
            timeout_secs: 30,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_emulator_host(mut self, host: impl Into<String>) -> Self {
        self.emulator_host = Some(host.into());
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    pub fn is_emulator(&self) -> bool {
        self.emulator_host.is_some()
    }

    /// `.../v1/projects/{project}/databases/{database}/documents`
    pub fn documents_url(&self) -> String {
        let host = match &self.emulator_host {
            Some(host) => format!("http://{}", host),
            None => PRODUCTION_HOST.to_string(),
        };
        format!(
            "{}/v1/projects/{}/databases/{}/documents",
            host, self.project_id, self.database
        )
    }
}

#[cfg(feature = "config")]
impl FromEnv for FirestoreConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `FIREBASE_PROJECT_ID` (optional): overrides the key's project
    /// - `FIRESTORE_DATABASE` (optional): database id, default `(default)`
    /// - `FIRESTORE_EMULATOR_HOST` (optional): talk to a local emulator
    /// - `FIRESTORE_PAGE_SIZE` (optional): default 300
    /// - `FIRESTORE_TIMEOUT_SECS` (optional): default 30
    fn from_env() -> Result<Self, ConfigError> {
        let emulator_host = std::env::var("FIRESTORE_EMULATOR_HOST")
            .ok()
            .filter(|host| !host.is_empty());

        Ok(Self {
            project_id: env_or_default("FIREBASE_PROJECT_ID", ""),
            database: env_or_default("FIRESTORE_DATABASE", "(default)"),
            emulator_host,
            page_size: env_parse_or_default("FIRESTORE_PAGE_SIZE", "300")?,
            timeout_secs: env_parse_or_default("FIRESTORE_TIMEOUT_SECS", "30")?,
        })
    }
}
