//! Error types for the sync pipeline.

use search_sync_repository::{SearchIndexError, SourceError, WatermarkStoreError};
use search_sync_shared::StreamKind;
use thiserror::Error;

/// Errors raised while extracting rows from the system of record.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Error from the relational source.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

impl ExtractError {
    /// Whether the error is a connection-level failure worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Source(e) => e.is_connection(),
        }
    }
}

/// Errors raised while validating rows and shaping them into documents.
///
/// Any transform error fails its whole batch: the watermark is not advanced,
/// so the batch is re-extracted on the next cycle instead of being indexed
/// with holes in it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A required field was NULL or absent in the source row.
    #[error("{entity} row is missing required field '{field}'")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    /// A field was present but could not be interpreted.
    #[error("{entity} row has invalid '{field}': {reason}")]
    InvalidField {
        entity: &'static str,
        field: &'static str,
        reason: String,
    },
}

impl TransformError {
    /// Create a missing-field error.
    pub fn missing(entity: &'static str, field: &'static str) -> Self {
        Self::MissingField { entity, field }
    }

    /// Create an invalid-field error.
    pub fn invalid(entity: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            entity,
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised while bulk-indexing documents or recording the watermark.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Error from the search index provider.
    #[error("Search index error: {0}")]
    SearchIndex(#[from] SearchIndexError),

    /// Error persisting the stream watermark.
    #[error("Watermark error: {0}")]
    Watermark(#[from] WatermarkStoreError),

    /// A document could not be serialized for the bulk request.
    #[error("Document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Umbrella error for one stream's sync pass within a poll cycle.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Extraction failed.
    #[error("Extract error: {0}")]
    Extract(#[from] ExtractError),

    /// Transformation failed.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Loading failed.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

/// Errors that abort the orchestrator itself rather than a single stream.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// An index could not be provisioned at startup.
    #[error("Failed to provision index for {stream}: {source}")]
    ProvisioningError {
        stream: StreamKind,
        #[source]
        source: SearchIndexError,
    },
}

impl OrchestratorError {
    /// Create a provisioning error.
    pub fn provisioning(stream: StreamKind, source: SearchIndexError) -> Self {
        Self::ProvisioningError { stream, source }
    }
}
