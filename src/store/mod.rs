//! Document store abstraction.
//!
//! The `DocumentStore` trait is the capability the update handler consumes: an
//! idempotent initialization step, declarative queries with named parameters,
//! and point operations addressed by identifier plus partition value. The
//! trait knows nothing about users; uniqueness rules and merge semantics live in
//! [`crate::users`].
//!
//! Stores own two system properties on every document they hand back:
//!
//! - [`ETAG_FIELD`] - an opaque revision token that changes on every write
//! - [`TIMESTAMP_FIELD`] - Unix seconds of the last write
//!
//! # Example Usage
//!
//! ```rust
//! use users_api::store::{DocumentStore, Filter, InMemoryDocumentStore, QuerySpec};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryDocumentStore::new();
//! store.initialize().await?;
//!
//! store.upsert("user", json!({"id": "u1", "type": "user", "username": "alice"})).await?;
//!
//! let spec = QuerySpec::new(Filter::eq_param("username", "@username"))
//!     .with_parameter("@username", json!("alice"));
//! let found = store.query(&spec).await?;
//! assert_eq!(found.len(), 1);
//!
//! let etag = found[0]["_etag"].as_str().map(str::to_string);
//! let mut updated = found[0].clone();
//! updated["username"] = json!("alice2");
//! store.replace("u1", "user", updated, etag.as_deref()).await?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;
pub mod query;

pub use errors::StoreError;
pub use in_memory::{InMemoryDocumentStore, InMemoryStoreStats};
pub use query::{Filter, Operand, QuerySpec};

use serde_json::Value;
use std::future::Future;

/// Name of the revision-token system property.
pub const ETAG_FIELD: &str = "_etag";

/// Name of the last-write timestamp system property.
pub const TIMESTAMP_FIELD: &str = "_ts";

/// Core trait for document stores.
///
/// Documents are JSON objects with a string `id`. The partition value is
/// supplied by the caller for point operations; queries span all partitions.
pub trait DocumentStore: Send + Sync {
    /// The error type returned by store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Prepare the store for use.
    ///
    /// Must be idempotent: calling it again after a successful call is a no-op.
    /// A failed call may be retried.
    fn initialize(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Return all documents matching the query, ordered by `id`.
    fn query(
        &self,
        spec: &QuerySpec,
    ) -> impl Future<Output = Result<Vec<Value>, Self::Error>> + Send;

    /// Point read by identifier and partition value.
    fn read(
        &self,
        id: &str,
        partition: &str,
    ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send;

    /// Replace an existing document and return it as stored.
    ///
    /// # Behavior
    /// - Fails if no document exists at (`id`, `partition`)
    /// - Fails if the document body's `id` differs from `id`
    /// - When `if_match` is given, fails unless it equals the stored revision token
    /// - System properties in `document` are ignored and regenerated
    fn replace(
        &self,
        id: &str,
        partition: &str,
        document: Value,
        if_match: Option<&str>,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;

    /// Insert or replace a document in `partition` and return it as stored.
    fn upsert(
        &self,
        partition: &str,
        document: Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;
}
