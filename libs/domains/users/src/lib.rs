//! Users Domain
//!
//! Accounts live in the identity provider; each account has a profile
//! document in the `Users` collection keyed by its uid.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Register, login, reset, profile CRUD, tombstones
//! └──┬───────┬──┘
//!    │       │
//! ┌──▼────┐ ┌▼─────────┐
//! │ Repo  │ │ Identity │  ← Users collection / identity provider
//! └───────┘ └──────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{
//!     handlers,
//!     identity::InMemoryIdentityProvider,
//!     repository::DocumentUserRepository,
//!     service::UserService,
//! };
//! use database::firestore::InMemoryDocumentStore;
//! use email::{MockSmtpProvider, NotificationService};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = DocumentUserRepository::new(Arc::new(InMemoryDocumentStore::new()));
//! let notifications = NotificationService::with_provider(Arc::new(MockSmtpProvider::new()))?;
//! let service = UserService::new(
//!     repository,
//!     Arc::new(InMemoryIdentityProvider::new()),
//!     notifications,
//! );
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use identity::{
    FirebaseIdentityProvider, IdentityConfig, IdentityError, IdentityProvider,
    InMemoryIdentityProvider,
};
pub use models::{CreateUser, LoginRequest, UserProfile};
pub use repository::{DocumentUserRepository, UserRepository};
pub use service::UserService;
