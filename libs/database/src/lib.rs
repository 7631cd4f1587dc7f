//! Document-store access for the gateway.
//!
//! The gateway only ever talks to a Firestore-style document database: named
//! collections of JSON documents keyed by opaque string ids. Everything above
//! this crate goes through the [`firestore::DocumentStore`] trait, so tests and
//! local development can swap the REST client for the in-memory store.
//!
//! # Features
//!
//! - `firestore` (default) - Firestore REST v1 client and service-account tokens
//! - `config` - `core_config::FromEnv` for [`firestore::FirestoreConfig`]
//! - `mock` - exposes `MockDocumentStore` (mockall) to downstream tests
//! - `all` - `firestore` + `config`
//!
//! # Example
//!
//! ```ignore
//! use database::firestore::{self, DocumentStore, FirestoreConfig, GoogleCredentials};
//!
//! let http = reqwest::Client::new();
//! let credentials = GoogleCredentials::from_service_account_file("key.json", None, http.clone())?;
//! let config = FirestoreConfig::new(credentials.project_id.clone());
//! let store = firestore::connect_with_retry(&config, &credentials, http, None).await?;
//!
//! let rooms = store.list("Room").await?;
//! ```

pub mod common;
pub mod firestore;

pub use common::{DatabaseError, DatabaseResult};

/// HTTP client used by the Firestore and Identity Toolkit clients
#[cfg(feature = "firestore")]
pub use reqwest;
