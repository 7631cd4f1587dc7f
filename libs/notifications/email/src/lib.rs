//! Transactional email for the gateway
//!
//! ## Components
//!
//! - **Models**: [`Email`] message builder
//! - **Providers**: SMTP via lettre, and an in-process mock for tests
//! - **Templates**: Handlebars-based [`TemplateEngine`] with the password reset template
//! - **Service**: [`NotificationService`] renders a template and hands it to a provider
//!
//! ## Usage
//!
//! ```ignore
//! use core_config::FromEnv;
//! use email::{NotificationService, SmtpConfig, SmtpProvider};
//! use std::sync::Arc;
//!
//! let provider = Arc::new(SmtpProvider::new(SmtpConfig::from_env()?)?);
//! let notifications = NotificationService::with_provider(provider)?;
//! notifications.send_password_reset("user@example.com", &link).await?;
//! ```

pub mod models;
pub mod provider;
pub mod service;
pub mod templates;

pub use models::Email;
pub use provider::{
    EmailProvider, MockSmtpProvider, SendResult, SmtpConfig, SmtpProvider, TlsMode,
};
pub use service::{NotificationService, NotificationServiceConfig, PasswordResetEmailData};
pub use templates::{EmailTemplate, RenderedTemplate, TemplateEngine, PASSWORD_RESET};
