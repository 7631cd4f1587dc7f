use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;

use super::{IdentityError, IdentityProvider, IdentityResult};

#[derive(Debug, Clone)]
struct Account {
    email: String,
    password: String,
}

/// In-memory implementation of IdentityProvider (for development/testing)
///
/// Mirrors the provider's error codes for the cases the gateway handles.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityProvider {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    next_id: Arc<AtomicU64>,
    fail_deletes: Arc<AtomicBool>,
    continue_url: Arc<String>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self {
            continue_url: Arc::new("http://localhost/__/auth/".to_string()),
            ..Default::default()
        }
    }

    /// Make every `delete_user` fail until switched back
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub async fn contains(&self, uid: &str) -> bool {
        self.accounts.read().await.contains_key(uid)
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    async fn uid_for_email(&self, email: &str) -> Option<String> {
        self.accounts
            .read()
            .await
            .iter()
            .find(|(_, account)| account.email.eq_ignore_ascii_case(email))
            .map(|(uid, _)| uid.clone())
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_user(&self, email: &str, password: &str) -> IdentityResult<String> {
        if password.len() < 6 {
            return Err(IdentityError::Rejected(
                "WEAK_PASSWORD : Password should be at least 6 characters".to_string(),
            ));
        }

        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|account| account.email.eq_ignore_ascii_case(email))
        {
            return Err(IdentityError::Rejected("EMAIL_EXISTS".to_string()));
        }

        let uid = format!("local{:023}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        accounts.insert(
            uid.clone(),
            Account {
                email: email.to_string(),
                password: password.to_string(),
            },
        );

        tracing::debug!(uid = %uid, "Created in-memory identity");
        Ok(uid)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> IdentityResult<String> {
        self.accounts
            .read()
            .await
            .iter()
            .find(|(_, account)| {
                account.email.eq_ignore_ascii_case(email) && account.password == password
            })
            .map(|(uid, _)| uid.clone())
            .ok_or_else(|| IdentityError::Rejected("INVALID_LOGIN_CREDENTIALS".to_string()))
    }

    async fn delete_user(&self, uid: &str) -> IdentityResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(IdentityError::Rejected(
                "INTERNAL_ERROR : delete unavailable".to_string(),
            ));
        }

        match self.accounts.write().await.remove(uid) {
            Some(_) => Ok(()),
            None => Err(IdentityError::UserNotFound),
        }
    }

    async fn password_reset_link(&self, email: &str) -> IdentityResult<String> {
        let uid = self
            .uid_for_email(email)
            .await
            .ok_or_else(|| IdentityError::Rejected("EMAIL_NOT_FOUND".to_string()))?;

        Ok(format!(
            "{}?mode=resetPassword&oobCode={}&apiKey=local",
            self.continue_url, uid
        ))
    }
}
