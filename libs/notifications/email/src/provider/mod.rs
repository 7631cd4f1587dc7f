//! Email provider implementations

pub mod mock;
pub mod smtp;

pub use mock::MockSmtpProvider;
pub use smtp::{SmtpConfig, SmtpProvider, TlsMode};

use crate::models::Email;
use async_trait::async_trait;
use eyre::Result;

/// Result of sending an email
#[derive(Debug)]
pub struct SendResult {
    /// Provider-specific message ID
    pub message_id: String,
}

/// Trait for email providers
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &Email) -> Result<SendResult>;

    /// Check that the provider is reachable
    async fn health_check(&self) -> Result<()>;

    fn name(&self) -> &'static str;
}
