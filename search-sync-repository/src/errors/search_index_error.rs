//! Search index error types.

use thiserror::Error;

/// Errors from search index operations.
///
/// Used by the `SearchIndexProvider` trait for index provisioning and bulk
/// upserts. The loader consults [`SearchIndexError::is_transient`] to decide
/// whether a failed bulk call is worth retrying with backoff.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchIndexError {
    /// Failed to reach the search index backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The bulk endpoint answered with a non-success HTTP status.
    #[error("Bulk request failed with status {status}: {reason}")]
    BulkRequestError { status: u16, reason: String },

    /// Failed to create the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to parse a response from the search index backend.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the search index backend.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SearchIndexError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a bulk request error.
    pub fn bulk_request(status: u16, reason: impl Into<String>) -> Self {
        Self::BulkRequestError {
            status,
            reason: reason.into(),
        }
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Whether retrying the same call can plausibly succeed.
    ///
    /// Transport failures and non-success bulk statuses are transient from
    /// the pipeline's point of view; re-submitting an identical batch is safe
    /// because upserts are idempotent. Serialization and parse errors are
    /// deterministic and retrying them just repeats the failure.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError(_) | Self::BulkRequestError { .. }
        )
    }
}
