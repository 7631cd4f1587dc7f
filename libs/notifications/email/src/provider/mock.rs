//! In-process email provider that records instead of sending

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use eyre::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Captures sent emails; optionally fails every send.
///
/// Clones share the same outbox, so a test can keep one handle and pass
/// another into the code under test.
#[derive(Clone, Default)]
pub struct MockSmtpProvider {
    sent_emails: Arc<Mutex<Vec<Email>>>,
    failure_message: Option<String>,
}

impl MockSmtpProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose sends and health checks always fail
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent_emails: Arc::default(),
            failure_message: Some(message.into()),
        }
    }

    pub async fn sent_emails(&self) -> Vec<Email> {
        self.sent_emails.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent_emails.lock().await.len()
    }

    pub async fn last_email(&self) -> Option<Email> {
        self.sent_emails.lock().await.last().cloned()
    }

    pub async fn clear(&self) {
        self.sent_emails.lock().await.clear();
    }

    /// Check if an email was sent to a specific address
    pub async fn was_sent_to(&self, email: &str) -> bool {
        self.sent_emails
            .lock()
            .await
            .iter()
            .any(|e| e.to == email)
    }
}

#[async_trait]
impl EmailProvider for MockSmtpProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        if let Some(message) = &self.failure_message {
            return Err(eyre::eyre!(message.clone()));
        }

        self.sent_emails.lock().await.push(email.clone());

        Ok(SendResult {
            message_id: format!("mock-{}", email.id),
        })
    }

    async fn health_check(&self) -> Result<()> {
        match &self.failure_message {
            Some(_) => Err(eyre::eyre!("Mock health check failed")),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_records_email() {
        let provider = MockSmtpProvider::new();
        let outbox = provider.clone();

        let email = Email::new("test@example.com", "Test Subject").with_text("Test body");
        let result = provider.send(&email).await.unwrap();

        assert_eq!(result.message_id, format!("mock-{}", email.id));
        assert_eq!(outbox.sent_count().await, 1);
        assert_eq!(outbox.last_email().await.unwrap().to, "test@example.com");
        assert!(outbox.was_sent_to("test@example.com").await);
        assert!(!outbox.was_sent_to("other@example.com").await);
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider = MockSmtpProvider::failing("Simulated failure");

        let email = Email::new("test@example.com", "Test Subject").with_text("Test body");
        let result = provider.send(&email).await;

        assert!(result.unwrap_err().to_string().contains("Simulated failure"));
        assert!(provider.health_check().await.is_err());
        assert_eq!(provider.sent_count().await, 0);
    }

    #[tokio::test]
    async fn test_clear() {
        let provider = MockSmtpProvider::new();
        provider
            .send(&Email::new("a@b.io", "x").with_text("y"))
            .await
            .unwrap();
        provider.clear().await;
        assert!(provider.sent_emails().await.is_empty());
    }
}
