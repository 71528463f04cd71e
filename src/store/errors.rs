//! Store-specific error types.
//!
//! These errors describe failures of the document store itself and know nothing
//! about HTTP or user semantics. The handler layer folds all of them into a
//! single unexpected-failure response.

use std::fmt;

/// Errors that can occur during document store operations.
#[derive(Debug)]
pub enum StoreError {
    /// No document exists at the given identifier and partition.
    NotFound { partition: String, id: String },

    /// A conditional write carried a revision token that no longer matches.
    PreconditionFailed {
        partition: String,
        id: String,
        expected_etag: String,
        actual_etag: Option<String>,
    },

    /// The document cannot be stored (not an object, missing or mismatched `id`).
    InvalidDocument { message: String },

    /// The query is malformed.
    InvalidQuery {
        message: String,
        parameter: Option<String>,
    },

    /// The startup seed file could not be read or parsed.
    Seed { path: String, message: String },

    /// Serialization or deserialization error.
    Serialization { message: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound { partition, id } => {
                write!(f, "Document not found: {}/{}", partition, id)
            }
            StoreError::PreconditionFailed {
                partition,
                id,
                expected_etag,
                actual_etag,
            } => match actual_etag {
                Some(actual) => write!(
                    f,
                    "Precondition failed for {}/{}: expected etag {}, found {}",
                    partition, id, expected_etag, actual
                ),
                None => write!(
                    f,
                    "Precondition failed for {}/{}: expected etag {}, document has none",
                    partition, id, expected_etag
                ),
            },
            StoreError::InvalidDocument { message } => {
                write!(f, "Invalid document: {}", message)
            }
            StoreError::InvalidQuery { message, parameter } => match parameter {
                Some(name) => write!(f, "Invalid query: {} (parameter: {})", message, name),
                None => write!(f, "Invalid query: {}", message),
            },
            StoreError::Seed { path, message } => {
                write!(f, "Failed to load seed documents from {}: {}", path, message)
            }
            StoreError::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Serialization {
            message: error.to_string(),
        }
    }
}

impl StoreError {
    /// Create an invalid-document error.
    pub fn invalid_document(message: impl Into<String>) -> Self {
        StoreError::InvalidDocument {
            message: message.into(),
        }
    }

    /// Whether this error is a revision-token mismatch.
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, StoreError::PreconditionFailed { .. })
    }
}
