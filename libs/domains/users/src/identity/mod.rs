//! Identity provider seam.
//!
//! The gateway never stores passwords; account creation, password checks,
//! deletion and reset links are delegated to an [`IdentityProvider`].

mod firebase;
mod memory;

pub use firebase::{FirebaseIdentityProvider, IdentityConfig};
pub use memory::InMemoryIdentityProvider;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider refused the request; the message is the provider's own
    /// code such as `EMAIL_EXISTS` or `INVALID_LOGIN_CREDENTIALS`
    #[error("{0}")]
    Rejected(String),

    #[error("USER_NOT_FOUND")]
    UserNotFound,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Unexpected identity response: {0}")]
    InvalidResponse(String),
}

pub type IdentityResult<T> = Result<T, IdentityError>;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an email/password account and return its uid
    async fn create_user(&self, email: &str, password: &str) -> IdentityResult<String>;

    /// Verify credentials and return the account's uid
    async fn sign_in_with_password(&self, email: &str, password: &str) -> IdentityResult<String>;

    async fn delete_user(&self, uid: &str) -> IdentityResult<()>;

    /// One-time password reset link for `email`
    async fn password_reset_link(&self, email: &str) -> IdentityResult<String>;
}
