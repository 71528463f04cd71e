//! Partial update of user documents.
//!
//! [`UpdateUserHandler`] runs the whole update flow against any
//! [`DocumentStore`]:
//!
//! 1. resolve the identifier (route binding, then last path segment)
//! 2. initialize the store
//! 3. look the user up by `type` and `id`
//! 4. parse the body
//! 5. reject the update if another user owns the supplied email or username
//! 6. merge truthy fields into the stored document
//! 7. replace it, conditional on the revision token from step 3
//!
//! Store operations run sequentially and nothing is retried.

use crate::context::RequestContext;
use crate::error::{ApiError, ApiResult};
use crate::store::{DocumentStore, Filter, QuerySpec};
use crate::users::identifier::resolve_user_id;
use crate::users::merge::merge_user;
use crate::users::model::{USER_TYPE, UserDocument, UserPatch};
use log::{debug, error, info, trace, warn};
use serde_json::{Value, json};

/// Applies PATCH requests to user documents.
#[derive(Debug, Clone)]
pub struct UpdateUserHandler<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> UpdateUserHandler<S> {
    /// Create a handler over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Update a user and return the document as stored.
    ///
    /// `route_user_id` is the structured route binding when the router
    /// provided one; `request_path` is the raw request path used as fallback.
    /// Unexpected failures are logged here with the request id.
    pub async fn update(
        &self,
        route_user_id: Option<&str>,
        request_path: &str,
        body: &[u8],
        context: &RequestContext,
    ) -> ApiResult<Value> {
        let result = self
            .apply_update(route_user_id, request_path, body, context)
            .await;

        if let Err(ApiError::Unexpected(detail)) = &result {
            error!(
                "Error updating user (request: '{}'): {}",
                context.request_id, detail
            );
        }

        result
    }

    async fn apply_update(
        &self,
        route_user_id: Option<&str>,
        request_path: &str,
        body: &[u8],
        context: &RequestContext,
    ) -> ApiResult<Value> {
        if route_user_id.is_none_or(str::is_empty) {
            debug!(
                "No route binding for user id, falling back to path '{}' (request: '{}')",
                request_path, context.request_id
            );
        }
        let Some(user_id) = resolve_user_id(route_user_id, request_path) else {
            warn!(
                "UserId parameter is missing (request: '{}')",
                context.request_id
            );
            return Err(ApiError::MissingUserId);
        };

        info!(
            "Updating user '{}' (request: '{}')",
            user_id, context.request_id
        );

        self.store.initialize().await.map_err(ApiError::unexpected)?;

        let Some(existing) = self.find_user(&user_id).await? else {
            warn!(
                "User '{}' not found (request: '{}')",
                user_id, context.request_id
            );
            return Err(ApiError::UserNotFound);
        };

        let patch = UserPatch::from_slice(body)?;
        trace!("Update patch for '{}': {:?}", user_id, patch);

        self.check_conflicts(&user_id, &patch, context).await?;

        let merged = merge_user(&existing, &patch);
        let partition = existing.partition().unwrap_or(USER_TYPE);

        let replaced = self
            .store
            .replace(&user_id, partition, merged, existing.etag())
            .await
            .map_err(ApiError::unexpected)?;

        debug!(
            "User '{}' replaced (request: '{}')",
            user_id, context.request_id
        );
        Ok(replaced)
    }

    /// Look a user up by discriminator and identifier.
    async fn find_user(&self, user_id: &str) -> ApiResult<Option<UserDocument>> {
        let spec = QuerySpec::new(
            Filter::eq_param("type", "@type").and(Filter::eq_param("id", "@userId")),
        )
        .with_parameter("@type", json!(USER_TYPE))
        .with_parameter("@userId", json!(user_id));

        let found = self.store.query(&spec).await.map_err(ApiError::unexpected)?;
        found
            .into_iter()
            .next()
            .map(UserDocument::from_value)
            .transpose()
    }

    /// Reject the patch if another user already owns its email or username.
    ///
    /// Email conflicts are checked across every candidate before usernames.
    async fn check_conflicts(
        &self,
        user_id: &str,
        patch: &UserPatch,
        context: &RequestContext,
    ) -> ApiResult<()> {
        if !patch.has_unique_fields() {
            return Ok(());
        }

        let spec = QuerySpec::new(Filter::eq_literal("type", USER_TYPE).and(
            Filter::eq_param("email", "@email").or(Filter::eq_param("username", "@username")),
        ))
        .with_optional_parameter("@email", patch.email.as_ref())
        .with_optional_parameter("@username", patch.username.as_ref());

        let candidates: Vec<UserDocument> = self
            .store
            .query(&spec)
            .await
            .map_err(ApiError::unexpected)?
            .into_iter()
            .map(UserDocument::from_value)
            .collect::<ApiResult<_>>()?;

        let others: Vec<&UserDocument> = candidates
            .iter()
            .filter(|candidate| candidate.id() != Some(user_id))
            .collect();

        if let Some(email) = &patch.email {
            if others.iter().any(|other| other.email() == Some(email)) {
                warn!(
                    "Email already in use, rejecting update of '{}' (request: '{}')",
                    user_id, context.request_id
                );
                return Err(ApiError::EmailExists);
            }
        }

        if let Some(username) = &patch.username {
            if others.iter().any(|other| other.username() == Some(username)) {
                warn!(
                    "Username already in use, rejecting update of '{}' (request: '{}')",
                    user_id, context.request_id
                );
                return Err(ApiError::UsernameExists);
            }
        }

        Ok(())
    }
}
