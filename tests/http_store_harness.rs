#![allow(unused)]
//! HTTP record store integration harness.
//!
//! # What this covers
//!
//! Runs [`HttpStore`] against a fake record service (`axum`, random port on
//! 127.0.0.1) that filters and pages the fixture corpora the way the real
//! service does.
//!
//! - **Request shape**: free text as `q`, predicates and filters under their
//!   service names, `limit` / `offset` from the page, the right endpoint per
//!   entity.
//! - **Decoding**: the `{results, total, limit, offset}` envelope, naive
//!   timestamps, missing optional fields.
//! - **Statistics**: `/stats` decoded into counters, `/stats/{domains,
//!   countries,stealers}` decoded into tallies.
//! - **Failure mapping**: non-2xx → `Status`, slow → `Timeout`, garbage →
//!   `Decode`, nothing listening → `Transport`.
//! - **End to end**: the orchestrator over the HTTP store, including an
//!   outage that keeps the last page visible until `retry`.
//!
//! # What this does NOT cover
//!
//! - TLS (the record service is reached over plain HTTP)
//! - Connection pool tuning
//!
//! # Running
//!
//! ```sh
//! cargo test --test http_store_harness
//! ```

mod common;
use common::fake_record_api::FakeRecordApi;
use common::*;

use pretty_assertions::assert_eq;
use snatch_core::orchestrator::SearchStatus;
use snatch_core::query;
use snatch_core::store::{RecordStore, SearchRequest, StoreError};
use snatch_core::{EntityType, FilterKey, Filters, ResultSet, Tally};
use snatch_store::HttpStore;
use std::sync::Arc;
use std::time::Duration;

async fn start() -> (FakeRecordApi, HttpStore) {
    let api = FakeRecordApi::start(credentials(), systems()).await.unwrap();
    let store = HttpStore::new(&api.base_url(), Duration::from_secs(5)).unwrap();
    (api, store)
}

fn request(entity: EntityType, text: &str, page: u64, page_size: u64) -> SearchRequest {
    let parsed = query::parse(text).ready().expect("query long enough");
    SearchRequest::new(1, parsed, Filters::new(entity), page, page_size)
}

// ---------------------------------------------------------------------------
// Request shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn credential_search_sends_text_and_paging() {
    let (api, store) = start().await;

    let set = store.search(&request(EntityType::Credential, "john", 1, 50)).await.unwrap();
    assert_credential_ids!(&set, [4, 3, 1]);
    assert_eq!(set.total(), 3);

    let sent = api.last_request().await;
    assert_eq!(sent.path, "/search/credentials");
    assert_eq!(sent.params.get("q").map(String::as_str), Some("john"));
    assert_eq!(sent.params.get("limit").map(String::as_str), Some("50"));
    assert_eq!(sent.params.get("offset").map(String::as_str), Some("0"));
}

#[tokio::test]
async fn predicates_and_filters_use_service_names() {
    let (api, store) = start().await;

    let parsed = query::parse("user:maria leak data").ready().unwrap();
    let filters = Filters::new(EntityType::Credential).set(FilterKey::StealerName, "Raccoon").unwrap();
    let req = SearchRequest::new(1, parsed, filters, 1, 50);
    store.search(&req).await.unwrap();

    let sent = api.last_request().await;
    assert_eq!(sent.params.get("q").map(String::as_str), Some("leak data"));
    assert_eq!(sent.params.get("username").map(String::as_str), Some("maria"));
    assert_eq!(sent.params.get("stealer_name").map(String::as_str), Some("Raccoon"));
    assert!(!sent.params.contains_key("user"));
}

#[tokio::test]
async fn predicate_only_query_matches_without_text() {
    let (api, store) = start().await;

    let set = store.search(&request(EntityType::Credential, "user:maria", 1, 50)).await.unwrap();
    assert_credential_ids!(&set, [8, 2]);
    assert!(!api.last_request().await.params.contains_key("q"));
}

#[tokio::test]
async fn second_page_uses_offset_and_keeps_total() {
    let (api, store) = start().await;

    // Every fixture host is https://…
    let set = store.search(&request(EntityType::Credential, "https", 2, 4)).await.unwrap();
    assert_credential_ids!(&set, [5, 4, 3, 2]);
    assert_eq!(set.total(), 9);
    assert_eq!(set.page(), 2);
    assert_eq!(api.last_request().await.params.get("offset").map(String::as_str), Some("4"));
}

#[tokio::test]
async fn system_search_hits_the_systems_endpoint() {
    let (api, store) = start().await;

    let set = store.search(&request(EntityType::System, "country:BR", 1, 50)).await.unwrap();
    assert_system_ids!(&set, [3, 2]);
    let sent = api.last_request().await;
    assert_eq!(sent.path, "/search/systems");
    assert_eq!(sent.params.get("country").map(String::as_str), Some("BR"));
}

#[tokio::test]
async fn system_predicate_on_credentials_sends_nothing() {
    let (api, store) = start().await;

    let set = store.search(&request(EntityType::Credential, "country:RU", 1, 50)).await.unwrap();
    assert_eq!(set.entity(), EntityType::Credential);
    assert_eq!(set.total(), 0);
    assert!(api.requests().await.is_empty());
}

#[tokio::test]
async fn text_with_reserved_characters_survives_the_trip() {
    let (api, store) = start().await;

    store.search(&request(EntityType::Credential, "a&b=c d%", 1, 50)).await.unwrap();
    assert_eq!(api.last_request().await.params.get("q").map(String::as_str), Some("a&b=c d%"));
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn statistics_are_decoded() {
    let (api, store) = start().await;

    let stats = store.statistics().await.unwrap();
    assert_eq!(stats.total_credentials, 9);
    assert_eq!(stats.total_systems, 5);
    assert_eq!(stats.total_records(), 14);
    assert_eq!(api.last_request().await.path, "/stats");
}

#[tokio::test]
async fn breakdowns_are_decoded_per_column() {
    let (api, store) = start().await;

    let domains = store.top_domains(2).await.unwrap();
    assert_eq!(domains, vec![Tally::new("www.paypal.com", 3), Tally::new("accounts.google.com", 1)]);
    let sent = api.last_request().await;
    assert_eq!(sent.path, "/stats/domains");
    assert_eq!(sent.params.get("limit").map(String::as_str), Some("2"));

    let countries = store.top_countries(20).await.unwrap();
    assert_eq!(countries, vec![Tally::new("BR", 2), Tally::new("US", 2), Tally::new("DE", 1)]);
    assert_eq!(api.last_request().await.path, "/stats/countries");

    let stealers = store.top_stealers(1).await.unwrap();
    assert_eq!(stealers, vec![Tally::new("Lumma", 2)]);
}

#[tokio::test]
async fn breakdown_failure_maps_like_search() {
    let (api, store) = start().await;
    api.fail_with(503, "maintenance").await;

    let err = store.top_stealers(5).await.unwrap_err();
    assert_eq!(err, StoreError::Status { status: 503, body: "maintenance".into() });
}

// ---------------------------------------------------------------------------
// Failure mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn error_status_carries_code_and_body() {
    let (api, store) = start().await;
    api.fail_with(500, "database is on fire").await;

    let err = store.search(&request(EntityType::Credential, "john", 1, 50)).await.unwrap_err();
    assert_eq!(err, StoreError::Status { status: 500, body: "database is on fire".into() });
    assert_eq!(err.to_string(), "record service returned 500: database is on fire");
}

#[tokio::test]
async fn slow_service_times_out() {
    let api = FakeRecordApi::start(credentials(), systems()).await.unwrap();
    let store = HttpStore::new(&api.base_url(), Duration::from_millis(100)).unwrap();
    api.delay(Duration::from_millis(800)).await;

    let err = store.search(&request(EntityType::Credential, "john", 1, 50)).await.unwrap_err();
    assert_eq!(err, StoreError::Timeout(100));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let (api, store) = start().await;
    api.send_garbage().await;

    let err = store.statistics().await.unwrap_err();
    assert!(matches!(err, StoreError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn nothing_listening_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpStore::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = store.search(&request(EntityType::Credential, "john", 1, 50)).await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)), "{err:?}");
}

// ---------------------------------------------------------------------------
// End to end through the orchestrator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn orchestrator_over_http() {
    let (_api, store) = start().await;
    let mut orch = orchestrator(Arc::new(store));

    orch.set_free_text("paypal");
    orch.settle().await;
    assert_eq!(orch.status(), &SearchStatus::Success);
    assert_credential_ids!(orch.machine().results().unwrap(), [9, 2, 1]);

    orch.set_filter(FilterKey::StealerName, "redline").unwrap();
    orch.settle().await;
    assert_credential_ids!(orch.machine().results().unwrap(), [1]);
}

#[tokio::test]
async fn outage_keeps_last_page_until_retry() {
    let (api, store) = start().await;
    let mut orch = orchestrator(Arc::new(store));

    orch.set_free_text("paypal");
    orch.settle().await;

    api.fail_with(503, "maintenance").await;
    orch.set_filter(FilterKey::Software, "brave").unwrap();
    orch.settle().await;
    assert!(matches!(orch.status(), SearchStatus::Error(msg) if msg.contains("503")));
    assert_credential_ids!(orch.machine().results().unwrap(), [9, 2, 1]);

    api.heal().await;
    orch.retry();
    orch.settle().await;
    assert_credential_ids!(orch.machine().results().unwrap(), [9]);
}
