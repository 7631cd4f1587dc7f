//! Ledger Domain
//!
//! Read-only reporting over the `Users`, `Room`, `Members`, `Contribution`
//! and `Expense` collections: full listings, foreign-key joins and
//! amount totals.
//!
//! # Usage
//!
//! ```rust,no_run
//! use database::firestore::InMemoryDocumentStore;
//! use domain_ledger::{LedgerConfig, LedgerService, handlers};
//! use std::sync::Arc;
//!
//! let service = LedgerService::new(Arc::new(InMemoryDocumentStore::new()), LedgerConfig::default());
//! let router = handlers::router(service);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod service;

pub use error::{LedgerError, LedgerResult};
pub use models::{ExpenseSum, JoinKeys, LedgerConfig, PaymentSum};
pub use service::LedgerService;
