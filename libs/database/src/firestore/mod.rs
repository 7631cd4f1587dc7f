//! Firestore document store
//!
//! The [`DocumentStore`] trait is always available together with the
//! in-memory implementation; the REST client, credentials and connector
//! require the `firestore` feature.

mod health;
mod memory;
mod store;
pub mod value;

#[cfg(feature = "firestore")]
mod client;
#[cfg(feature = "firestore")]
mod config;
#[cfg(feature = "firestore")]
mod connector;
#[cfg(feature = "firestore")]
pub mod credentials;

pub use health::{HealthStatus, check_health_detailed};
pub use memory::InMemoryDocumentStore;
#[cfg(any(test, feature = "mock"))]
pub use store::MockDocumentStore;
pub use store::{Document, DocumentStore, StoredDocument};

#[cfg(feature = "firestore")]
pub use client::FirestoreClient;
#[cfg(feature = "firestore")]
pub use config::FirestoreConfig;
#[cfg(feature = "firestore")]
pub use connector::connect_with_retry;
#[cfg(feature = "firestore")]
pub use credentials::{GoogleCredentials, StaticTokenSource, TokenSource};
