//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch,
//! etc.).

use async_trait::async_trait;
use search_sync_shared::StreamKind;

use crate::errors::SearchIndexError;
use crate::types::{BulkSummary, UpsertAction};

/// Abstracts the underlying search index implementation.
///
/// There is no separate create-vs-update surface: the pipeline only ever
/// upserts, and an upsert fully replaces any existing document with the same
/// id. That matches the denormalized nature of the data - the relational
/// source is the single source of truth, and a re-synced document supersedes
/// whatever the index held before.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Ensure the index for the given stream exists, creating it with its
    /// field mappings if necessary.
    ///
    /// Idempotent; called once per stream during startup, before the first
    /// poll tick.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index exists or was created
    /// * `Err(SearchIndexError)` - If existence cannot be confirmed
    async fn ensure_index_exists(&self, stream: StreamKind) -> Result<(), SearchIndexError>;

    /// Upsert a batch of documents into the stream's index.
    ///
    /// A failed call (transport error, non-success status) is reported as an
    /// error and the whole batch can be safely re-submitted. Per-document
    /// rejections inside a successful call are reported in the returned
    /// summary instead of failing the call.
    ///
    /// # Arguments
    ///
    /// * `stream` - The stream whose index receives the documents
    /// * `actions` - One action per document, id plus full body
    ///
    /// # Returns
    ///
    /// * `Ok(BulkSummary)` - Counts and per-document errors
    /// * `Err(SearchIndexError)` - If the bulk call itself failed
    async fn bulk_upsert(
        &self,
        stream: StreamKind,
        actions: &[UpsertAction],
    ) -> Result<BulkSummary, SearchIndexError>;
}
