//! SMTP email provider using lettre

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use core_config::{env_or_default, env_parse_or_default, ConfigError, FromEnv};
use eyre::{Result, WrapErr};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::str::FromStr;
use std::sync::Arc;

/// How the SMTP connection is secured
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Plain connection upgraded with STARTTLS (submission port 587)
    #[default]
    StartTls,
    /// TLS from the first byte (port 465)
    Implicit,
    /// No encryption, for local catchers like Mailpit
    None,
}

impl FromStr for TlsMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "starttls" => Ok(Self::StartTls),
            "tls" | "implicit" => Ok(Self::Implicit),
            "none" | "plain" => Ok(Self::None),
            other => Err(format!("unknown SMTP TLS mode '{}'", other)),
        }
    }
}

/// SMTP provider configuration
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    pub tls: TlsMode,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("tls", &self.tls)
            .finish()
    }
}

impl SmtpConfig {
    /// `Name <address>` as used in the From header
    pub fn sender(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

/// First non-empty value among `keys`
fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty())
}

impl FromEnv for SmtpConfig {
    /// Load SMTP settings.
    ///
    /// - `SMTP_HOST` (default `mail.thegatewaydigital.com`), `SMTP_PORT` (default 587)
    /// - `SMTP_USERNAME`, falling back to `USER` (required)
    /// - `SMTP_PASSWORD`, falling back to `PASSWORD` (required)
    /// - `SMTP_TLS`: `starttls` (default), `tls` or `none`
    /// - `EMAIL_FROM_ADDRESS`, `EMAIL_FROM_NAME`
    fn from_env() -> std::result::Result<Self, ConfigError> {
        let username = first_env(&["SMTP_USERNAME", "USER"])
            .ok_or_else(|| ConfigError::MissingEnvVar("SMTP_USERNAME".to_string()))?;
        let password = first_env(&["SMTP_PASSWORD", "PASSWORD"])
            .ok_or_else(|| ConfigError::MissingEnvVar("SMTP_PASSWORD".to_string()))?;

        Ok(Self {
            host: env_or_default("SMTP_HOST", "mail.thegatewaydigital.com"),
            port: env_parse_or_default("SMTP_PORT", "587")?,
            username,
            password,
            from_email: env_or_default(
                "EMAIL_FROM_ADDRESS",
                "noreply@gatewayutsav-921d6.firebaseapp.com",
            ),
            from_name: env_or_default("EMAIL_FROM_NAME", "Gateway Utsav Team"),
            tls: env_parse_or_default("SMTP_TLS", "starttls")?,
        })
    }
}

/// SMTP email provider
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: Arc<SmtpConfig>,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> Result<Self> {
        let builder = match config.tls {
            TlsMode::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                    .wrap_err("Failed to create STARTTLS relay")?
            }
            TlsMode::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .wrap_err("Failed to create TLS relay")?,
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        }
        .port(config.port);

        let transport = if config.username.is_empty() {
            builder.build()
        } else {
            builder
                .credentials(Credentials::new(
                    config.username.clone(),
                    config.password.clone(),
                ))
                .build()
        };

        Ok(Self {
            transport,
            config: Arc::new(config),
        })
    }

    fn build_message(&self, email: &Email) -> Result<Message> {
        let from: Mailbox = self
            .config
            .sender()
            .parse()
            .wrap_err("Invalid from address")?;
        let to: Mailbox = email.to.parse().wrap_err("Invalid to address")?;

        let builder = Message::builder().from(from).to(to).subject(&email.subject);

        let message = match (&email.body_text, &email.body_html) {
            (Some(text), Some(html)) => builder
                .multipart(
                    MultiPart::alternative()
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_PLAIN)
                                .body(text.clone()),
                        )
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_HTML)
                                .body(html.clone()),
                        ),
                )
                .wrap_err("Failed to build multipart message")?,
            (Some(text), None) => builder
                .header(ContentType::TEXT_PLAIN)
                .body(text.clone())
                .wrap_err("Failed to build text message")?,
            (None, Some(html)) => builder
                .header(ContentType::TEXT_HTML)
                .body(html.clone())
                .wrap_err("Failed to build HTML message")?,
            (None, None) => {
                return Err(eyre::eyre!("Email must have either text or HTML body"));
            }
        };

        Ok(message)
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        let message = self.build_message(email)?;

        let response = self
            .transport
            .send(message)
            .await
            .wrap_err("Failed to send email via SMTP")?;

        let message_id = response
            .message()
            .next()
            .map(|s| s.to_string())
            .unwrap_or_else(|| email.id.clone());

        tracing::info!(
            email_id = %email.id,
            to = %email.to,
            subject = %email.subject,
            "Email sent successfully"
        );

        Ok(SendResult { message_id })
    }

    async fn health_check(&self) -> Result<()> {
        let reachable = self
            .transport
            .test_connection()
            .await
            .wrap_err("SMTP health check failed")?;
        if !reachable {
            return Err(eyre::eyre!("SMTP server did not accept the connection"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(tls: TlsMode) -> SmtpConfig {
        SmtpConfig {
            host: "localhost".to_string(),
            port: 1025,
            username: String::new(),
            password: String::new(),
            from_email: "noreply@gatewayutsav-921d6.firebaseapp.com".to_string(),
            from_name: "Gateway Utsav Team".to_string(),
            tls,
        }
    }

    #[test]
    fn test_tls_mode_parsing() {
        assert_eq!("starttls".parse::<TlsMode>().unwrap(), TlsMode::StartTls);
        assert_eq!("TLS".parse::<TlsMode>().unwrap(), TlsMode::Implicit);
        assert_eq!("none".parse::<TlsMode>().unwrap(), TlsMode::None);
        assert!("ssl3".parse::<TlsMode>().is_err());
    }

    #[test]
    fn test_build_text_message() {
        let provider = SmtpProvider::new(config(TlsMode::None)).unwrap();
        let email = Email::new("user@example.com", "Reset your password").with_text("Hello");

        let message = provider.build_message(&email).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Reset your password"));
        assert!(raw.contains("Gateway Utsav Team"));
        assert!(raw.contains("To: user@example.com"));
    }

    #[test]
    fn test_build_message_requires_body() {
        let provider = SmtpProvider::new(config(TlsMode::None)).unwrap();
        let email = Email::new("user@example.com", "Empty");
        assert!(provider.build_message(&email).is_err());
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let provider = SmtpProvider::new(config(TlsMode::None)).unwrap();
        let email = Email::new("not an address", "Hi").with_text("x");
        assert!(provider.build_message(&email).is_err());
    }

    #[test]
    fn test_from_env_falls_back_to_user_and_password() {
        temp_env::with_vars(
            [
                ("SMTP_USERNAME", None::<&str>),
                ("SMTP_PASSWORD", None),
                ("USER", Some("mailer")),
                ("PASSWORD", Some("secret")),
                ("SMTP_HOST", None),
                ("SMTP_PORT", None),
                ("SMTP_TLS", None),
                ("EMAIL_FROM_NAME", None),
            ],
            || {
                let config = SmtpConfig::from_env().unwrap();
                assert_eq!(config.username, "mailer");
                assert_eq!(config.password, "secret");
                assert_eq!(config.host, "mail.thegatewaydigital.com");
                assert_eq!(config.port, 587);
                assert_eq!(config.tls, TlsMode::StartTls);
                assert_eq!(
                    config.sender(),
                    "Gateway Utsav Team <noreply@gatewayutsav-921d6.firebaseapp.com>"
                );
                assert!(!format!("{:?}", config).contains("secret"));
            },
        );
    }

    #[test]
    fn test_from_env_prefers_smtp_username() {
        temp_env::with_vars(
            [
                ("SMTP_USERNAME", Some("smtp-user")),
                ("SMTP_PASSWORD", Some("pw")),
                ("USER", Some("shell-user")),
            ],
            || {
                assert_eq!(SmtpConfig::from_env().unwrap().username, "smtp-user");
            },
        );
    }

    #[test]
    fn test_from_env_requires_password() {
        temp_env::with_vars(
            [
                ("SMTP_USERNAME", Some("smtp-user")),
                ("SMTP_PASSWORD", None::<&str>),
                ("PASSWORD", None),
            ],
            || {
                assert!(matches!(
                    SmtpConfig::from_env(),
                    Err(ConfigError::MissingEnvVar(_))
                ));
            },
        );
    }
}
