//! In-memory document store.
//!
//! A thread-safe implementation of [`DocumentStore`] backed by nested
//! `HashMap`s under a tokio `RwLock`, for development, tests, and single-node
//! deployments where persistence is not required.
//!
//! # Features
//!
//! * Partitioned layout: `partition` → `id` → `document`
//! * Revision tokens (`_etag`) derived from a SHA-256 content hash and a write sequence
//! * Conditional replace on revision token
//! * One-time seeding from a JSON file during [`DocumentStore::initialize`]
//!
//! # Example Usage
//!
//! ```rust
//! use users_api::store::{DocumentStore, InMemoryDocumentStore};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryDocumentStore::new();
//! let stored = store
//!     .upsert("user", json!({"id": "u1", "type": "user", "email": "a@x.com"}))
//!     .await?;
//! assert!(stored.get("_etag").is_some());
//!
//! let read = store.read("u1", "user").await?;
//! assert_eq!(read, Some(stored));
//! # Ok(())
//! # }
//! ```

use crate::config::StoreConfig;
use crate::store::{DocumentStore, ETAG_FIELD, QuerySpec, StoreError, TIMESTAMP_FIELD};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use log::{debug, info, trace};
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{OnceCell, RwLock};

/// Thread-safe in-memory document store.
///
/// Clones share the same underlying data.
#[derive(Debug, Clone)]
pub struct InMemoryDocumentStore {
    // Structure: partition -> id -> document
    data: Arc<RwLock<HashMap<String, HashMap<String, Value>>>>,
    writes: Arc<AtomicU64>,
    initialized: Arc<OnceCell<()>>,
    seed_path: Option<PathBuf>,
    label: String,
}

impl InMemoryDocumentStore {
    /// Create a new empty store with no seed file.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            writes: Arc::new(AtomicU64::new(0)),
            initialized: Arc::new(OnceCell::new()),
            seed_path: None,
            label: "memory".to_string(),
        }
    }

    /// Create a store that loads `path` on first initialization.
    pub fn with_seed_file(path: impl Into<PathBuf>) -> Self {
        Self {
            seed_path: Some(path.into()),
            ..Self::new()
        }
    }

    /// Create a store from configuration.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            seed_path: config.seed_file.clone(),
            label: format!("{}/{}", config.database_id, config.container_id),
            ..Self::new()
        }
    }

    /// Get store statistics for debugging and monitoring.
    pub async fn stats(&self) -> InMemoryStoreStats {
        let data_guard = self.data.read().await;
        InMemoryStoreStats {
            partition_count: data_guard.len(),
            document_count: data_guard.values().map(HashMap::len).sum(),
        }
    }

    /// Whether initialization has completed.
    pub fn is_initialized(&self) -> bool {
        self.initialized.initialized()
    }

    async fn load_seed(&self) -> Result<(), StoreError> {
        let Some(path) = &self.seed_path else {
            info!("Initialized empty document store '{}'", self.label);
            return Ok(());
        };

        let display_path = path.display().to_string();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Seed {
                path: display_path.clone(),
                message: e.to_string(),
            })?;
        let documents: Vec<Value> =
            serde_json::from_str(&contents).map_err(|e| StoreError::Seed {
                path: display_path.clone(),
                message: e.to_string(),
            })?;

        let count = documents.len();
        let mut prepared = Vec::with_capacity(count);
        for document in documents {
            let partition = document
                .get("type")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| StoreError::Seed {
                    path: display_path.clone(),
                    message: "every seed document needs a string 'type'".to_string(),
                })?;
            let (id, stamped) = self.prepare(document)?;
            prepared.push((partition, id, stamped));
        }

        // Nothing is inserted unless the whole file is valid
        let mut data_guard = self.data.write().await;
        for (partition, id, stamped) in prepared {
            data_guard
                .entry(partition)
                .or_insert_with(HashMap::new)
                .insert(id, stamped);
        }

        info!(
            "Initialized document store '{}' with {} seed documents from {}",
            self.label, count, display_path
        );
        Ok(())
    }

    /// Validate a document, strip stale system properties and stamp fresh ones.
    fn prepare(&self, document: Value) -> Result<(String, Value), StoreError> {
        let Value::Object(mut fields) = document else {
            return Err(StoreError::invalid_document("document must be a JSON object"));
        };
        let id = match fields.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => {
                return Err(StoreError::invalid_document(
                    "document must have a non-empty string 'id'",
                ));
            }
        };

        fields.remove(ETAG_FIELD);
        fields.remove(TIMESTAMP_FIELD);

        let sequence = self.writes.fetch_add(1, Ordering::Relaxed);
        let etag = Self::compute_etag(&fields, sequence)?;
        fields.insert(ETAG_FIELD.to_string(), json!(etag));
        fields.insert(
            TIMESTAMP_FIELD.to_string(),
            json!(chrono::Utc::now().timestamp()),
        );

        Ok((id, Value::Object(fields)))
    }

    fn compute_etag(fields: &Map<String, Value>, sequence: u64) -> Result<String, StoreError> {
        let content = serde_json::to_vec(fields)?;
        let mut hasher = Sha256::new();
        hasher.update(&content);
        hasher.update(sequence.to_be_bytes());
        let hash = hasher.finalize();
        Ok(BASE64.encode(&hash[..8]))
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    type Error = StoreError;

    async fn initialize(&self) -> Result<(), Self::Error> {
        self.initialized
            .get_or_try_init(|| self.load_seed())
            .await
            .map(|_| ())
    }

    async fn query(&self, spec: &QuerySpec) -> Result<Vec<Value>, Self::Error> {
        spec.validate()?;
        debug!("Query on '{}': {}", self.label, spec);
        trace!("Query parameters: {:?}", spec.parameters());

        let data_guard = self.data.read().await;
        let mut results: Vec<Value> = data_guard
            .values()
            .flat_map(HashMap::values)
            .filter(|document| spec.matches(document))
            .cloned()
            .collect();

        results.sort_by(|a, b| {
            let a_id = a.get("id").and_then(Value::as_str).unwrap_or_default();
            let b_id = b.get("id").and_then(Value::as_str).unwrap_or_default();
            a_id.cmp(b_id)
        });

        trace!("Query returned {} documents", results.len());
        Ok(results)
    }

    async fn read(&self, id: &str, partition: &str) -> Result<Option<Value>, Self::Error> {
        let data_guard = self.data.read().await;
        Ok(data_guard
            .get(partition)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn replace(
        &self,
        id: &str,
        partition: &str,
        document: Value,
        if_match: Option<&str>,
    ) -> Result<Value, Self::Error> {
        if document.get("id").and_then(Value::as_str) != Some(id) {
            return Err(StoreError::invalid_document(format!(
                "document id does not match replace target '{}'",
                id
            )));
        }

        let mut data_guard = self.data.write().await;
        let current = data_guard
            .get(partition)
            .and_then(|documents| documents.get(id))
            .ok_or_else(|| StoreError::NotFound {
                partition: partition.to_string(),
                id: id.to_string(),
            })?;

        if let Some(expected) = if_match {
            let actual = current.get(ETAG_FIELD).and_then(Value::as_str);
            if actual != Some(expected) {
                return Err(StoreError::PreconditionFailed {
                    partition: partition.to_string(),
                    id: id.to_string(),
                    expected_etag: expected.to_string(),
                    actual_etag: actual.map(str::to_string),
                });
            }
        }

        let (id, stamped) = self.prepare(document)?;
        debug!("Replacing {}/{} in '{}'", partition, id, self.label);
        data_guard
            .entry(partition.to_string())
            .or_insert_with(HashMap::new)
            .insert(id, stamped.clone());

        Ok(stamped)
    }

    async fn upsert(&self, partition: &str, document: Value) -> Result<Value, Self::Error> {
        let (id, stamped) = self.prepare(document)?;
        debug!("Upserting {}/{} in '{}'", partition, id, self.label);

        let mut data_guard = self.data.write().await;
        data_guard
            .entry(partition.to_string())
            .or_insert_with(HashMap::new)
            .insert(id, stamped.clone());

        Ok(stamped)
    }
}

/// Statistics about the current state of the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryStoreStats {
    /// Number of partitions holding at least one document
    pub partition_count: usize,
    /// Total number of documents
    pub document_count: usize,
}
