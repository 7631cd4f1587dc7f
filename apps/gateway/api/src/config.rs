use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::firestore::FirestoreConfig;
use domain_ledger::LedgerConfig;
use domain_users::IdentityConfig;
use email::{NotificationServiceConfig, SmtpConfig};
use eyre::WrapErr;

pub use core_config::Environment;

/// Application-specific configuration
/// Composes the shared config sections of each library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub firestore: FirestoreConfig,
    pub identity: IdentityConfig,
    pub smtp: SmtpConfig,
    pub notifications: NotificationServiceConfig,
    pub ledger: LedgerConfig,
    /// Service-account key path (`GOOGLE_APPLICATION_CREDENTIALS`)
    pub credentials_path: Option<String>,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=8080
        let firestore = FirestoreConfig::from_env().wrap_err("Invalid Firestore configuration")?;
        let identity = IdentityConfig::from_env().wrap_err("Invalid identity configuration")?;
        let smtp = SmtpConfig::from_env().wrap_err("Invalid SMTP configuration")?;
        let notifications = NotificationServiceConfig::from_env()?;
        let ledger = LedgerConfig::from_env()?;
        let credentials_path = std::env::var("GOOGLE_APPLICATION_CREDENTIALS")
            .ok()
            .filter(|path| !path.is_empty());

        let config = Self {
            app: app_info!(),
            server,
            firestore,
            identity,
            smtp,
            notifications,
            ledger,
            credentials_path,
            environment,
        };

        if config.credentials_path.is_none() && !config.uses_emulators() {
            eyre::bail!(
                "GOOGLE_APPLICATION_CREDENTIALS is required unless FIRESTORE_EMULATOR_HOST or FIREBASE_AUTH_EMULATOR_HOST is set"
            );
        }

        Ok(config)
    }

    /// True when either Firebase emulator is configured
    pub fn uses_emulators(&self) -> bool {
        self.firestore.is_emulator() || self.identity.is_emulator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEARED: [&str; 8] = [
        "GOOGLE_APPLICATION_CREDENTIALS",
        "FIRESTORE_EMULATOR_HOST",
        "FIREBASE_AUTH_EMULATOR_HOST",
        "FIREBASE_PROJECT_ID",
        "LEDGER_JOIN_CONCURRENCY",
        "PORT",
        "SMTP_USERNAME",
        "SMTP_PASSWORD",
    ];

    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let mut all: Vec<(&str, Option<&str>)> = CLEARED.iter().map(|k| (*k, None)).collect();
        all.push(("API_KEY", Some("web-key")));
        all.push(("USER", Some("mailer")));
        all.push(("PASSWORD", Some("secret")));
        for (key, value) in vars {
            all.retain(|(k, _)| k != key);
            all.push((*key, Some(*value)));
        }
        temp_env::with_vars(all, f);
    }

    #[test]
    fn test_emulator_config_needs_no_key_file() {
        with_env(
            &[
                ("FIRESTORE_EMULATOR_HOST", "localhost:8081"),
                ("FIREBASE_AUTH_EMULATOR_HOST", "localhost:9099"),
                ("FIREBASE_PROJECT_ID", "demo-gateway"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.uses_emulators());
                assert!(config.credentials_path.is_none());
                assert_eq!(config.firestore.project_id, "demo-gateway");
                assert_eq!(config.identity.api_key, "web-key");
                assert_eq!(config.smtp.username, "mailer");
                assert_eq!(config.ledger.join_concurrency, 16);
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.app.name, "gateway_api");
            },
        );
    }

    #[test]
    fn test_production_requires_key_file() {
        with_env(&[], || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("GOOGLE_APPLICATION_CREDENTIALS"));
        });
    }

    #[test]
    fn test_key_file_path_is_read() {
        with_env(
            &[("GOOGLE_APPLICATION_CREDENTIALS", "/secrets/key.json")],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.credentials_path.as_deref(), Some("/secrets/key.json"));
                assert!(!config.uses_emulators());
            },
        );
    }

    #[test]
    fn test_missing_api_key_fails() {
        with_env(&[("FIRESTORE_EMULATOR_HOST", "localhost:8081")], || {
            temp_env::with_var_unset("API_KEY", || {
                assert!(Config::from_env().is_err());
            });
        });
    }

    #[test]
    fn test_invalid_join_concurrency_fails() {
        with_env(
            &[
                ("FIRESTORE_EMULATOR_HOST", "localhost:8081"),
                ("LEDGER_JOIN_CONCURRENCY", "0"),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
