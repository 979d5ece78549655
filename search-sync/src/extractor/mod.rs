//! Watermark-driven extraction from the system of record.
//!
//! For each stream, the extractor issues one query per poll cycle selecting
//! rows with `modified > since`, ascending by `modified`, and exposes the
//! result as a sequence of bounded batches. The underlying result set is
//! streamed server-side, so peak memory stays proportional to the batch size
//! no matter how far behind the watermark is.
//!
//! Opening a stream *primes* it: the query is issued and the first batch is
//! pulled immediately, so connection failures surface inside the retry
//! window rather than on the first batch access. Errors after priming abort
//! the remaining batches for this cycle; the watermark only moves on
//! successful loads, so the next cycle re-extracts from the same point.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{BoxStream, Fuse};
use futures::{StreamExt, TryStreamExt};
use tracing::debug;

use crate::errors::ExtractError;
use crate::retry::{retry_with_backoff, RetryPolicy};
use search_sync_repository::{CatalogSource, CategoryRow, PersonRow, RowStream, WorkRow};

/// A primed sequence of row batches for one stream and one poll cycle.
///
/// The first batch is already in memory when this is handed out; the rest
/// are pulled lazily. Exhaustion is final: once `next_batch` returns
/// `Ok(None)` it keeps returning `Ok(None)`.
pub struct RowBatches<'a, R> {
    first: Option<Vec<R>>,
    rest: Fuse<BoxStream<'a, Result<Vec<R>, ExtractError>>>,
}

impl<R> RowBatches<'_, R> {
    /// Pull the next batch, or `None` when the stream is exhausted.
    ///
    /// Batches are never empty and arrive in ascending `modified` order.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<R>>, ExtractError> {
        if let Some(first) = self.first.take() {
            return Ok(Some(first));
        }

        self.rest.try_next().await
    }
}

/// Extractor over a [`CatalogSource`].
pub struct Extractor {
    source: Arc<dyn CatalogSource>,
    batch_size: usize,
    retry: RetryPolicy,
}

impl Extractor {
    /// Create an extractor with the default retry policy.
    ///
    /// `batch_size` must be positive.
    pub fn new(source: Arc<dyn CatalogSource>, batch_size: usize) -> Self {
        Self::with_retry_policy(source, batch_size, RetryPolicy::default())
    }

    /// Create an extractor with a custom retry policy.
    pub fn with_retry_policy(
        source: Arc<dyn CatalogSource>,
        batch_size: usize,
        retry: RetryPolicy,
    ) -> Self {
        assert!(batch_size > 0, "batch_size must be positive");
        Self {
            source,
            batch_size,
            retry,
        }
    }

    /// Open the works stream for rows with `modified > since`.
    pub async fn open_works(
        &self,
        since: DateTime<Utc>,
    ) -> Result<RowBatches<'_, WorkRow>, ExtractError> {
        let batches = retry_with_backoff(
            &self.retry,
            "open works stream",
            || Self::prime(self.batch_size, self.source.stream_works(since)),
            ExtractError::is_transient,
        )
        .await?;

        debug!(stream = "works", since = %since, "Stream opened");
        Ok(batches)
    }

    /// Open the people stream for rows with `modified > since`.
    pub async fn open_people(
        &self,
        since: DateTime<Utc>,
    ) -> Result<RowBatches<'_, PersonRow>, ExtractError> {
        let batches = retry_with_backoff(
            &self.retry,
            "open people stream",
            || Self::prime(self.batch_size, self.source.stream_people(since)),
            ExtractError::is_transient,
        )
        .await?;

        debug!(stream = "people", since = %since, "Stream opened");
        Ok(batches)
    }

    /// Open the categories stream for rows with `modified > since`.
    pub async fn open_categories(
        &self,
        since: DateTime<Utc>,
    ) -> Result<RowBatches<'_, CategoryRow>, ExtractError> {
        let batches = retry_with_backoff(
            &self.retry,
            "open categories stream",
            || Self::prime(self.batch_size, self.source.stream_categories(since)),
            ExtractError::is_transient,
        )
        .await?;

        debug!(stream = "categories", since = %since, "Stream opened");
        Ok(batches)
    }

    /// Chunk a row stream and pull its first batch.
    async fn prime<'a, R>(
        batch_size: usize,
        rows: RowStream<'a, R>,
    ) -> Result<RowBatches<'a, R>, ExtractError>
    where
        R: Send + 'a,
    {
        // A mid-chunk error drops the partial chunk. That is safe: the
        // watermark has not advanced, so those rows are re-extracted next
        // cycle.
        let mut rest = rows
            .try_chunks(batch_size)
            .map(|chunk| chunk.map_err(|e| ExtractError::from(e.1)))
            .boxed()
            .fuse();

        let first = rest.try_next().await?;

        Ok(RowBatches { first, rest })
    }
}
