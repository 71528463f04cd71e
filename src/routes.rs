//! HTTP routing for the users API.
//!
//! ```rust,no_run
//! use users_api::routes::router;
//! use users_api::store::InMemoryDocumentStore;
//! use users_api::users::UpdateUserHandler;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = router(UpdateUserHandler::new(InMemoryDocumentStore::new()));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:7071").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::store::DocumentStore;
use crate::users::UpdateUserHandler;
use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::Uri;
use axum::routing::patch;
use log::{error, warn};
use serde_json::Value;
use std::sync::Arc;

/// Build the router.
///
/// `PATCH /users/{userId}` binds the identifier from the route. `PATCH /users`
/// and `PATCH /users/` reach the same handler without a binding, so the
/// identifier comes from the last path segment.
///
/// Extractor rejections never reach the client as axum's plain-text
/// responses. A route binding that fails to decode falls back to the last path
/// segment, and a body that cannot be buffered is an unexpected failure.
pub fn router<S>(handler: UpdateUserHandler<S>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route("/users/{userId}", patch(update_user::<S>))
        .route("/users", patch(update_user_unbound::<S>))
        .route("/users/", patch(update_user_unbound::<S>))
        .with_state(Arc::new(handler))
}

async fn update_user<S>(
    State(handler): State<Arc<UpdateUserHandler<S>>>,
    user_id: Result<Path<String>, PathRejection>,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, ApiError>
where
    S: DocumentStore + 'static,
{
    let context = RequestContext::with_generated_id();
    let user_id = match user_id {
        Ok(Path(user_id)) => Some(user_id),
        Err(rejection) => {
            warn!(
                "Request {}: route binding rejected ({}), using path fallback",
                context.request_id, rejection
            );
            None
        }
    };
    let body = buffered_body(body, &context)?;
    handler
        .update(user_id.as_deref(), uri.path(), &body, &context)
        .await
        .map(Json)
}

async fn update_user_unbound<S>(
    State(handler): State<Arc<UpdateUserHandler<S>>>,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, ApiError>
where
    S: DocumentStore + 'static,
{
    let context = RequestContext::with_generated_id();
    let body = buffered_body(body, &context)?;
    handler
        .update(None, uri.path(), &body, &context)
        .await
        .map(Json)
}

fn buffered_body(
    body: Result<Bytes, BytesRejection>,
    context: &RequestContext,
) -> Result<Bytes, ApiError> {
    body.map_err(|rejection| {
        error!(
            "Request {}: failed to read request body: {}",
            context.request_id, rejection
        );
        ApiError::unexpected(rejection)
    })
}
