//! Shared helpers for the users API integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tower::ServiceExt;
use users_api::store::{DocumentStore, InMemoryDocumentStore, QuerySpec, StoreError};

/// Per-operation call counters.
#[derive(Debug, Default)]
pub struct OperationCounts {
    pub initialize: AtomicUsize,
    pub query: AtomicUsize,
    pub read: AtomicUsize,
    pub replace: AtomicUsize,
    pub upsert: AtomicUsize,
}

/// In-memory store that records which operations ran.
///
/// Clones share counters and data. Replaces can be forced to fail to exercise
/// unexpected-error paths.
#[derive(Debug, Clone, Default)]
pub struct RecordingStore {
    inner: InMemoryDocumentStore,
    counts: Arc<OperationCounts>,
    fail_replace: Arc<AtomicBool>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &InMemoryDocumentStore {
        &self.inner
    }

    pub fn initializations(&self) -> usize {
        self.counts.initialize.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.counts.query.load(Ordering::SeqCst)
    }

    pub fn replaces(&self) -> usize {
        self.counts.replace.load(Ordering::SeqCst)
    }

    /// Calls made through the store from the point of view of the handler.
    pub fn store_calls(&self) -> usize {
        self.initializations() + self.queries() + self.replaces()
            + self.counts.read.load(Ordering::SeqCst)
    }

    pub fn fail_replaces(&self) {
        self.fail_replace.store(true, Ordering::SeqCst);
    }

    /// Insert a user directly into the wrapped store without counting it.
    pub async fn seed(&self, document: Value) {
        self.inner.upsert("user", document).await.unwrap();
    }
}

impl DocumentStore for RecordingStore {
    type Error = StoreError;

    async fn initialize(&self) -> Result<(), Self::Error> {
        self.counts.initialize.fetch_add(1, Ordering::SeqCst);
        self.inner.initialize().await
    }

    async fn query(&self, spec: &QuerySpec) -> Result<Vec<Value>, Self::Error> {
        self.counts.query.fetch_add(1, Ordering::SeqCst);
        self.inner.query(spec).await
    }

    async fn read(&self, id: &str, partition: &str) -> Result<Option<Value>, Self::Error> {
        self.counts.read.fetch_add(1, Ordering::SeqCst);
        self.inner.read(id, partition).await
    }

    async fn replace(
        &self,
        id: &str,
        partition: &str,
        document: Value,
        if_match: Option<&str>,
    ) -> Result<Value, Self::Error> {
        self.counts.replace.fetch_add(1, Ordering::SeqCst);
        if self.fail_replace.load(Ordering::SeqCst) {
            return Err(StoreError::invalid_document("replace disabled for test"));
        }
        self.inner.replace(id, partition, document, if_match).await
    }

    async fn upsert(&self, partition: &str, document: Value) -> Result<Value, Self::Error> {
        self.counts.upsert.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(partition, document).await
    }
}

pub fn alice() -> Value {
    json!({
        "id": "u1",
        "type": "user",
        "name": "Alice",
        "username": "alice",
        "email": "a@x.com",
        "userImageUri": "https://img.example.com/alice.png",
        "followers": ["u2"],
        "following": []
    })
}

pub fn bob() -> Value {
    json!({
        "id": "u2",
        "type": "user",
        "name": "Bob",
        "username": "bob",
        "email": "b@x.com",
        "followers": [],
        "following": ["u1"]
    })
}

/// A store holding alice (`u1`) and bob (`u2`).
pub async fn seeded_store() -> RecordingStore {
    let store = RecordingStore::new();
    store.seed(alice()).await;
    store.seed(bob()).await;
    store
}

/// Response pieces the tests look at.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Value,
}

/// Send a PATCH through the router and decode the JSON body.
pub async fn patch(app: Router, uri: &str, body: &str) -> TestResponse {
    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap();

    TestResponse {
        status,
        content_type,
        body,
    }
}

/// User fields without store-managed system properties.
pub fn user_fields(document: &Value) -> Value {
    let mut document = document.clone();
    if let Some(fields) = document.as_object_mut() {
        fields.remove("_etag");
        fields.remove("_ts");
    }
    document
}
