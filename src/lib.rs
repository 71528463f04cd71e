//! Users API: partial updates of user documents over HTTP.
//!
//! A single endpoint, `PATCH /users/{userId}`, merges supplied profile fields
//! into a stored user document after checking that no other user owns the
//! requested email or username.
//!
//! # Core Components
//!
//! - [`UpdateUserHandler`] - the update flow, independent of HTTP
//! - [`DocumentStore`] - trait for the backing document database
//! - [`InMemoryDocumentStore`] - bundled store implementation
//! - [`routes::router`] - axum router exposing the endpoint
//!
//! # Quick Start
//!
//! ```rust
//! use users_api::{InMemoryDocumentStore, RequestContext, UpdateUserHandler};
//! use users_api::store::DocumentStore;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryDocumentStore::new();
//! store
//!     .upsert("user", json!({"id": "u1", "type": "user", "username": "alice"}))
//!     .await?;
//!
//! let handler = UpdateUserHandler::new(store);
//! let context = RequestContext::with_generated_id();
//! let updated = handler
//!     .update(Some("u1"), "/users/u1", br#"{"username": "alice2"}"#, &context)
//!     .await?;
//! assert_eq!(updated["username"], "alice2");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod routes;
pub mod store;
pub mod users;

pub use config::{ConfigError, ServiceConfig, StoreConfig};
pub use context::RequestContext;
pub use error::{ApiError, ApiResult};
pub use store::{DocumentStore, InMemoryDocumentStore, StoreError};
pub use users::{UpdateUserHandler, UserDocument, UserPatch};
