//! High-level notification API used by the gateway.
//!
//! Wraps an [`EmailProvider`] and the [`TemplateEngine`] so callers only
//! supply the recipient and the template variables.

use crate::models::Email;
use crate::provider::{EmailProvider, SendResult};
use crate::templates::{TemplateEngine, PASSWORD_RESET};
use core_config::{env_or_default, ConfigError, FromEnv};
use eyre::{Result, WrapErr};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Configuration for the notification service.
#[derive(Debug, Clone)]
pub struct NotificationServiceConfig {
    /// Product name shown in subjects and signatures
    pub app_name: String,
}

impl Default for NotificationServiceConfig {
    fn default() -> Self {
        Self {
            app_name: "Gateway Utsav".to_string(),
        }
    }
}

impl FromEnv for NotificationServiceConfig {
    fn from_env() -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            app_name: env_or_default("EMAIL_APP_NAME", "Gateway Utsav"),
        })
    }
}

/// Variables for the password reset template.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetEmailData<'a> {
    pub app_name: &'a str,
    pub email: &'a str,
    pub reset_link: &'a str,
}

/// Renders and sends transactional emails.
#[derive(Clone)]
pub struct NotificationService {
    provider: Arc<dyn EmailProvider>,
    templates: Arc<TemplateEngine>,
    config: NotificationServiceConfig,
}

impl NotificationService {
    pub fn new(
        provider: Arc<dyn EmailProvider>,
        templates: TemplateEngine,
        config: NotificationServiceConfig,
    ) -> Self {
        Self {
            provider,
            templates: Arc::new(templates),
            config,
        }
    }

    /// Service with the built-in templates and default config
    pub fn with_provider(provider: Arc<dyn EmailProvider>) -> Result<Self> {
        Ok(Self::new(
            provider,
            TemplateEngine::new()?,
            NotificationServiceConfig::default(),
        ))
    }

    /// Check that the underlying provider is reachable
    pub async fn health_check(&self) -> Result<()> {
        self.provider.health_check().await
    }

    /// Email a password reset link to `email`.
    pub async fn send_password_reset(&self, email: &str, reset_link: &str) -> Result<SendResult> {
        let data = PasswordResetEmailData {
            app_name: &self.config.app_name,
            email,
            reset_link,
        };
        let rendered = self
            .templates
            .render(PASSWORD_RESET, &serde_json::to_value(&data)?)?;

        let message = Email::from_rendered(email, rendered);
        let result = self
            .provider
            .send(&message)
            .await
            .wrap_err("Failed to send password reset email")?;

        info!(
            email_id = %message.id,
            to = %email,
            provider = self.provider.name(),
            "Sent password reset email"
        );

        Ok(result)
    }
}
