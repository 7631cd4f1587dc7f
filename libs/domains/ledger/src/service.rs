use database::firestore::{Document, DocumentStore, StoredDocument};
use futures::stream::{self, StreamExt, TryStreamExt};
use observability::LedgerMetrics;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{instrument, warn};

use crate::error::LedgerResult;
use crate::models::{DELETED_AT_FIELD, JoinKeys, LedgerConfig, ROOMS, USERS};

/// Read-only views over the collections: scans, joins and sums
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn DocumentStore>,
    config: LedgerConfig,
}

impl LedgerService {
    pub fn new(store: Arc<dyn DocumentStore>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Every document of `collection`, in scan order.
    ///
    /// Profiles awaiting account deletion are left out of `Users`.
    #[instrument(skip(self))]
    pub async fn list_all(&self, collection: &str) -> LedgerResult<Vec<Document>> {
        let docs = self.store.list(collection).await?;
        Ok(docs
            .into_iter()
            .map(|doc| doc.data)
            .filter(|data| collection != USERS || !data.contains_key(DELETED_AT_FIELD))
            .collect())
    }

    /// The `email` of every user that has a string one
    pub async fn list_emails(&self) -> LedgerResult<Vec<String>> {
        Ok(self
            .list_all(USERS)
            .await?
            .into_iter()
            .filter_map(|mut data| match data.remove("email") {
                Some(Value::String(email)) => Some(email),
                _ => None,
            })
            .collect())
    }

    /// Each document of `collection` with `r_name`, `u_name` and `u_img`
    /// copied from the room and user it references.
    ///
    /// Output keeps scan order. A missing reference leaves the joined
    /// fields empty; a failed lookup fails the whole listing.
    #[instrument(skip(self))]
    pub async fn list_joined(
        &self,
        collection: &str,
        keys: JoinKeys,
    ) -> LedgerResult<Vec<Document>> {
        let started = Instant::now();
        let docs = self.store.list(collection).await?;

        let joined: Vec<Document> = stream::iter(docs)
            .map(|doc| self.join_one(doc, keys))
            .buffered(self.config.join_concurrency.max(1))
            .try_collect()
            .await?;

        LedgerMetrics::record_join(collection, joined.len(), started.elapsed());
        Ok(joined)
    }

    /// Integer total of `field` across `collection`.
    ///
    /// Values with no leading integer are skipped with a warning.
    #[instrument(skip(self))]
    pub async fn sum_field(&self, collection: &str, field: &str) -> LedgerResult<i64> {
        let docs = self.store.list(collection).await?;

        let total = docs.iter().fold(0i64, |total, doc| {
            match doc.data.get(field).and_then(parse_amount) {
                Some(amount) => total.saturating_add(amount),
                None => {
                    warn!(
                        collection,
                        field,
                        id = %doc.id,
                        value = ?doc.data.get(field),
                        "Skipping amount with no leading integer"
                    );
                    LedgerMetrics::record_sum_skipped(collection, field);
                    total
                }
            }
        });

        Ok(total)
    }

    async fn join_one(&self, source: StoredDocument, keys: JoinKeys) -> LedgerResult<Document> {
        let (room, user) = futures::try_join!(
            self.lookup(ROOMS, foreign_key(&source.data, keys.room)),
            self.lookup(USERS, foreign_key(&source.data, keys.user)),
        )?;

        let mut record = source.data;
        record.insert("r_name".into(), copied(room.as_ref(), "r_name"));
        record.insert("u_name".into(), copied(user.as_ref(), "u_name"));
        record.insert("u_img".into(), copied(user.as_ref(), "u_img"));
        Ok(record)
    }

    async fn lookup(&self, collection: &str, id: Option<&str>) -> LedgerResult<Option<Document>> {
        match id {
            Some(id) => Ok(self.store.get(collection, id).await?),
            None => Ok(None),
        }
    }
}

/// Non-empty string value of `key`; anything else means no reference
fn foreign_key<'a>(data: &'a Document, key: &str) -> Option<&'a str> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// `field` of the referenced document, or `""`
fn copied(referenced: Option<&Document>, field: &str) -> Value {
    referenced
        .and_then(|doc| doc.get(field))
        .filter(|value| !value.is_null())
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
}

/// Integer part of an amount.
///
/// Amounts are usually strings. They are read up to the first character that
/// is not a digit, so `"250.50"` counts as 250 and `"100abc"` as 100. JSON
/// numbers are truncated.
fn parse_amount(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => leading_integer(s),
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        _ => None,
    }
}

/// Optional sign, optional `0x` prefix, then digits. `None` when no digit
/// follows; large values saturate.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..]),
        _ => (10, unsigned),
    };

    let mut magnitude: Option<i64> = None;
    for digit in digits.chars().map_while(|c| c.to_digit(radix)) {
        magnitude = Some(
            magnitude
                .unwrap_or(0)
                .saturating_mul(i64::from(radix))
                .saturating_add(i64::from(digit)),
        );
    }
    magnitude.map(|m| if negative { -m } else { m })
}
