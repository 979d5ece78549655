//! Loader for validated search documents.
//!
//! Bulk-upserts a batch of documents by id into the stream's index and, on
//! success, advances the stream's watermark to the last document's
//! `modified`. Upserts fully replace any existing document with the same id,
//! which is what makes re-delivery after a failed cycle harmless.

use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use crate::errors::LoadError;
use crate::retry::{retry_with_backoff, RetryPolicy};
use search_sync_repository::{
    SearchIndexError, SearchIndexProvider, UpsertAction, WatermarkStore,
};
use search_sync_shared::{SearchDocument, StreamKind};

/// Loader that indexes documents and records sync progress.
///
/// The loader is responsible for:
/// - Serializing documents into bulk upsert actions
/// - Retrying bulk-level failures with backoff, up to the attempt ceiling
/// - Advancing the watermark only after the batch is durably indexed
pub struct SearchLoader {
    provider: Arc<dyn SearchIndexProvider>,
    watermarks: Arc<dyn WatermarkStore>,
    retry: RetryPolicy,
}

impl SearchLoader {
    /// Create a new search loader with the default retry policy.
    pub fn new(provider: Arc<dyn SearchIndexProvider>, watermarks: Arc<dyn WatermarkStore>) -> Self {
        Self::with_retry_policy(provider, watermarks, RetryPolicy::default())
    }

    /// Create a new search loader with a custom retry policy.
    pub fn with_retry_policy(
        provider: Arc<dyn SearchIndexProvider>,
        watermarks: Arc<dyn WatermarkStore>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            watermarks,
            retry,
        }
    }

    /// Index one batch of documents and advance the stream's watermark.
    ///
    /// The batch must be ascending by `modified`; the last document's
    /// timestamp becomes the new watermark. An empty batch is a no-op.
    ///
    /// Per-document errors inside an otherwise successful bulk response are
    /// logged but do not fail the batch; the watermark still advances.
    /// Re-indexing those documents requires an upstream `modified` bump.
    #[instrument(skip(self, documents), fields(stream = %stream, document_count = documents.len()))]
    pub async fn load<D: SearchDocument>(
        &self,
        stream: StreamKind,
        documents: &[D],
    ) -> Result<(), LoadError> {
        if documents.is_empty() {
            debug!(stream = %stream, "No documents to load");
            return Ok(());
        }

        let actions = Self::to_actions(documents)?;

        let summary = retry_with_backoff(
            &self.retry,
            "bulk upsert",
            || self.provider.bulk_upsert(stream, &actions),
            SearchIndexError::is_transient,
        )
        .await?;

        if summary.failed > 0 {
            warn!(
                stream = %stream,
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Bulk upsert completed with per-document errors"
            );
            for item in &summary.errors {
                error!(
                    stream = %stream,
                    document_id = %item.id,
                    status = item.status,
                    reason = %item.reason,
                    "Failed to index document"
                );
            }
        } else {
            debug!(stream = %stream, indexed = summary.succeeded, "Bulk upsert complete");
        }

        // Batches are ascending by modified, so the last document carries
        // the new watermark
        if let Some(last) = documents.last() {
            self.watermarks.set(stream, last.modified()).await?;
            debug!(stream = %stream, watermark = %last.modified(), "Watermark advanced");
        }

        Ok(())
    }

    /// Serialize documents into one upsert action each.
    fn to_actions<D: SearchDocument>(documents: &[D]) -> Result<Vec<UpsertAction>, LoadError> {
        documents
            .iter()
            .map(|doc| {
                let source = serde_json::to_value(doc)?;
                Ok(UpsertAction {
                    id: doc.document_id().to_string(),
                    source,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use search_sync_repository::{BulkItemError, BulkSummary, WatermarkStoreError};
    use search_sync_shared::CategoryDocument;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use uuid::Uuid;

    fn fast_policy(max_tries: usize) -> RetryPolicy {
        RetryPolicy {
            max_tries,
            base_delay_ms: 1,
            factor: 1,
            max_delay: Duration::from_millis(2),
        }
    }

    fn category(minute: u32) -> CategoryDocument {
        CategoryDocument {
            id: Uuid::new_v4(),
            name: format!("Category {}", minute),
            modified: Utc.with_ymd_and_hms(2024, 6, 1, 9, minute, 0).unwrap(),
        }
    }

    /// Mock search provider with failure injection.
    struct MockSearchProvider {
        actions_seen: Mutex<Vec<UpsertAction>>,
        bulk_calls: AtomicUsize,
        transient_failures: AtomicUsize,
        permanent_failure: bool,
        item_errors: Vec<String>,
    }

    impl MockSearchProvider {
        fn new() -> Self {
            Self {
                actions_seen: Mutex::new(Vec::new()),
                bulk_calls: AtomicUsize::new(0),
                transient_failures: AtomicUsize::new(0),
                permanent_failure: false,
                item_errors: Vec::new(),
            }
        }

        fn failing_transiently(times: usize) -> Self {
            let provider = Self::new();
            provider.transient_failures.store(times, Ordering::SeqCst);
            provider
        }

        fn failing_permanently() -> Self {
            Self {
                permanent_failure: true,
                ..Self::new()
            }
        }

        fn with_item_errors(ids: Vec<String>) -> Self {
            Self {
                item_errors: ids,
                ..Self::new()
            }
        }

        fn calls(&self) -> usize {
            self.bulk_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SearchIndexProvider for MockSearchProvider {
        async fn ensure_index_exists(&self, _stream: StreamKind) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn bulk_upsert(
            &self,
            _stream: StreamKind,
            actions: &[UpsertAction],
        ) -> Result<BulkSummary, SearchIndexError> {
            self.bulk_calls.fetch_add(1, Ordering::SeqCst);

            if self.permanent_failure {
                return Err(SearchIndexError::parse("document rejected"));
            }

            let remaining = self.transient_failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.transient_failures.store(remaining - 1, Ordering::SeqCst);
                return Err(SearchIndexError::connection("search engine unavailable"));
            }

            self.actions_seen
                .lock()
                .unwrap()
                .extend_from_slice(actions);

            let errors: Vec<BulkItemError> = self
                .item_errors
                .iter()
                .map(|id| BulkItemError {
                    id: id.clone(),
                    status: 400,
                    reason: "mapper_parsing_exception".to_string(),
                })
                .collect();

            Ok(BulkSummary {
                total: actions.len(),
                succeeded: actions.len() - errors.len(),
                failed: errors.len(),
                errors,
            })
        }
    }

    /// Mock watermark store recording every set.
    struct MockWatermarkStore {
        sets: Mutex<Vec<(StreamKind, DateTime<Utc>)>>,
    }

    impl MockWatermarkStore {
        fn new() -> Self {
            Self {
                sets: Mutex::new(Vec::new()),
            }
        }

        fn recorded(&self) -> Vec<(StreamKind, DateTime<Utc>)> {
            self.sets.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WatermarkStore for MockWatermarkStore {
        async fn get(&self, _stream: StreamKind) -> Option<DateTime<Utc>> {
            None
        }

        async fn set(
            &self,
            stream: StreamKind,
            watermark: DateTime<Utc>,
        ) -> Result<(), WatermarkStoreError> {
            self.sets.lock().unwrap().push((stream, watermark));
            Ok(())
        }
    }

    fn loader_with(
        provider: Arc<MockSearchProvider>,
        watermarks: Arc<MockWatermarkStore>,
        max_tries: usize,
    ) -> SearchLoader {
        SearchLoader::with_retry_policy(provider, watermarks, fast_policy(max_tries))
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op() {
        let provider = Arc::new(MockSearchProvider::new());
        let watermarks = Arc::new(MockWatermarkStore::new());
        let loader = loader_with(Arc::clone(&provider), Arc::clone(&watermarks), 3);

        let documents: Vec<CategoryDocument> = Vec::new();
        loader
            .load(StreamKind::Categories, &documents)
            .await
            .unwrap();

        assert_eq!(provider.calls(), 0);
        assert!(watermarks.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_documents_become_upsert_actions_by_id() {
        let provider = Arc::new(MockSearchProvider::new());
        let watermarks = Arc::new(MockWatermarkStore::new());
        let loader = loader_with(Arc::clone(&provider), Arc::clone(&watermarks), 3);

        let documents = vec![category(1), category(2)];
        loader
            .load(StreamKind::Categories, &documents)
            .await
            .unwrap();

        let actions = provider.actions_seen.lock().unwrap().clone();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].id, documents[0].id.to_string());
        assert_eq!(actions[1].id, documents[1].id.to_string());
        assert_eq!(actions[0].source["name"], "Category 1");
    }

    #[tokio::test]
    async fn test_watermark_advances_to_last_document() {
        let provider = Arc::new(MockSearchProvider::new());
        let watermarks = Arc::new(MockWatermarkStore::new());
        let loader = loader_with(Arc::clone(&provider), Arc::clone(&watermarks), 3);

        let documents = vec![category(1), category(2), category(3)];
        let last_modified = documents[2].modified;

        loader
            .load(StreamKind::Categories, &documents)
            .await
            .unwrap();

        assert_eq!(
            watermarks.recorded(),
            vec![(StreamKind::Categories, last_modified)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried() {
        let provider = Arc::new(MockSearchProvider::failing_transiently(2));
        let watermarks = Arc::new(MockWatermarkStore::new());
        let loader = loader_with(Arc::clone(&provider), Arc::clone(&watermarks), 8);

        let documents = vec![category(1)];
        loader
            .load(StreamKind::Categories, &documents)
            .await
            .unwrap();

        assert_eq!(provider.calls(), 3);
        assert_eq!(watermarks.recorded().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_attempt_ceiling_without_advancing_watermark() {
        let provider = Arc::new(MockSearchProvider::failing_transiently(usize::MAX));
        let watermarks = Arc::new(MockWatermarkStore::new());
        let loader = loader_with(Arc::clone(&provider), Arc::clone(&watermarks), 3);

        let documents = vec![category(1)];
        let result = loader.load(StreamKind::Categories, &documents).await;

        assert!(result.is_err());
        assert_eq!(provider.calls(), 3);
        assert!(watermarks.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_non_transient_error_is_not_retried() {
        let provider = Arc::new(MockSearchProvider::failing_permanently());
        let watermarks = Arc::new(MockWatermarkStore::new());
        let loader = loader_with(Arc::clone(&provider), Arc::clone(&watermarks), 8);

        let documents = vec![category(1)];
        let result = loader.load(StreamKind::Categories, &documents).await;

        assert!(result.is_err());
        assert_eq!(provider.calls(), 1);
        assert!(watermarks.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_partial_item_failures_still_advance_watermark() {
        let documents = vec![category(1), category(2)];
        let provider = Arc::new(MockSearchProvider::with_item_errors(vec![documents[0]
            .id
            .to_string()]));
        let watermarks = Arc::new(MockWatermarkStore::new());
        let loader = loader_with(Arc::clone(&provider), Arc::clone(&watermarks), 3);

        loader
            .load(StreamKind::Categories, &documents)
            .await
            .unwrap();

        assert_eq!(
            watermarks.recorded(),
            vec![(StreamKind::Categories, documents[1].modified)]
        );
    }
}
