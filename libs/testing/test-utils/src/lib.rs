//! Shared test utilities for domain testing
//!
//! - `TestDataBuilder`: deterministic ids, emails and names
//! - `seeded_store`: an in-memory document store pre-filled with fixtures
//! - `TestFirestore`: Firestore emulator container (feature: "emulator")
//!
//! # Usage
//!
//! ```rust
//! use test_utils::{TestDataBuilder, seeded_store};
//! use serde_json::json;
//!
//! # async fn example() {
//! let builder = TestDataBuilder::from_test_name("my_test");
//! let store = seeded_store([
//!     ("Users", builder.doc_id("user"), json!({"email": builder.email("asha")})),
//! ])
//! .await;
//! # }
//! ```

use database::firestore::{Document, DocumentStore, InMemoryDocumentStore};
use serde_json::Value;

#[cfg(feature = "emulator")]
mod emulator;

#[cfg(feature = "emulator")]
pub use emulator::TestFirestore;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_register_user");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// A 28-character uid shaped like the ones the identity service issues
    pub fn uid(&self) -> String {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        uuid::Uuid::from_bytes(uuid_bytes).simple().to_string()[..28].to_string()
    }

    /// Document id unique to this builder and `label`
    pub fn doc_id(&self, label: &str) -> String {
        format!("{}-{:x}", label, self.seed)
    }

    pub fn email(&self, local: &str) -> String {
        format!("{}.{:x}@example.com", local, self.seed)
    }

    /// Generate a unique name for testing
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("room", "main"), "test-room-7-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }
}

/// Convert a `json!({...})` literal into a [`Document`]; non-objects panic
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be a JSON object, got {}", other),
    }
}

/// In-memory store holding the given `(collection, id, data)` fixtures
pub async fn seeded_store<I, C, D>(fixtures: I) -> InMemoryDocumentStore
where
    I: IntoIterator<Item = (C, D, Value)>,
    C: AsRef<str>,
    D: AsRef<str>,
{
    let store = InMemoryDocumentStore::new();
    for (collection, id, data) in fixtures {
        store
            .set(collection.as_ref(), id.as_ref(), doc(data))
            .await
            .expect("in-memory set cannot fail");
    }
    store
}

/// Test assertion helpers
pub mod assertions {
    use serde_json::Value;

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert `body[key]` is the string `expected`
    pub fn assert_str_field(body: &Value, key: &str, expected: &str) {
        assert_eq!(
            body.get(key).and_then(Value::as_str),
            Some(expected),
            "field `{}` in {}",
            key,
            body
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.uid(), builder2.uid());
        assert_eq!(builder1.uid().len(), 28);
        assert_eq!(builder1.email("a"), builder2.email("a"));
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        assert_ne!(builder1.doc_id("room"), builder2.doc_id("room"));
    }

    #[tokio::test]
    async fn test_seeded_store() {
        let store = seeded_store([
            ("Room", "r1", json!({"name": "Hall"})),
            ("Room", "r2", json!({"name": "Kitchen"})),
        ])
        .await;

        assert_eq!(store.count("Room").await, 2);
        let hall = store.get("Room", "r1").await.unwrap().unwrap();
        assert_eq!(hall["name"], "Hall");
    }
}
