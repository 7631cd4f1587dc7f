//! Ledger reads against a real Firestore emulator
//!
//! These tests start the Cloud SDK emulator via testcontainers to check:
//! - typed values written by the REST client read back as plain JSON
//! - joins and sums behave the same as over the in-memory store
//! - collection scans follow page tokens
//!
//! Run with `cargo test -p domain_ledger -- --ignored` on a machine with Docker.

use database::firestore::{DocumentStore, FirestoreClient, FirestoreConfig, GoogleCredentials};
use domain_ledger::models::{CONTRIBUTIONS, EXPENSE_AMOUNT_FIELD, EXPENSES, PAYMENT_FIELD, ROOMS, USERS};
use domain_ledger::{JoinKeys, LedgerConfig, LedgerService};
use serde_json::json;
use std::sync::Arc;
use test_utils::{TestDataBuilder, TestFirestore, assertions::assert_some, doc};

#[tokio::test]
#[ignore = "needs Docker for the Firestore emulator"]
async fn test_joined_expenses_over_emulator() {
    let firestore = TestFirestore::new("ledger-joins").await;
    let builder = TestDataBuilder::from_test_name("joined_expenses");
    let store = &firestore.client;

    let uid = builder.uid();
    let room = builder.doc_id("room");
    store
        .set(USERS, &uid, doc(json!({"uid": &uid, "u_name": "Asha", "u_img": null})))
        .await
        .unwrap();
    store
        .set(ROOMS, &room, doc(json!({"r_id": &room, "r_name": "Holi"})))
        .await
        .unwrap();
    store
        .set(EXPENSES, "e1", doc(json!({"r_id": &room, "uid": &uid, "e_amt": "120"})))
        .await
        .unwrap();
    store
        .set(EXPENSES, "e2", doc(json!({"r_id": &room, "uid": &uid, "e_amt": 30})))
        .await
        .unwrap();

    let ledger = LedgerService::new(Arc::new(firestore.client.clone()), LedgerConfig::default());

    let expenses = ledger.list_joined(EXPENSES, JoinKeys::default()).await.unwrap();
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0]["r_name"], "Holi");
    assert_eq!(expenses[0]["u_name"], "Asha");
    assert_eq!(expenses[0]["u_img"], "");

    let total = ledger.sum_field(EXPENSES, EXPENSE_AMOUNT_FIELD).await.unwrap();
    assert_eq!(total, 150);
}

#[tokio::test]
#[ignore = "needs Docker for the Firestore emulator"]
async fn test_scan_follows_page_tokens() {
    let firestore = TestFirestore::new("ledger-paging").await;

    let mut config =
        FirestoreConfig::new(&firestore.project_id).with_emulator_host(&firestore.emulator_host);
    config.page_size = 2;
    let paged = FirestoreClient::new(
        &config,
        GoogleCredentials::emulator(&firestore.project_id).tokens,
        database::reqwest::Client::new(),
    );

    for n in 0..5 {
        paged
            .set(CONTRIBUTIONS, &format!("c{n}"), doc(json!({"payment": n.to_string()})))
            .await
            .unwrap();
    }

    let scanned = paged.list(CONTRIBUTIONS).await.unwrap();
    assert_eq!(scanned.len(), 5);
    let last = assert_some(scanned.last(), "last contribution");
    assert_eq!(last.id, "c4");

    let ledger = LedgerService::new(Arc::new(paged), LedgerConfig::default());
    assert_eq!(ledger.sum_field(CONTRIBUTIONS, PAYMENT_FIELD).await.unwrap(), 10);
}
