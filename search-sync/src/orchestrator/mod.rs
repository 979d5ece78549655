//! Orchestrator for the catalog sync pipeline.
//!
//! Coordinates the extractor, transformer, and loader components: provisions
//! the search indices at startup, then drives the three entity streams to
//! exhaustion on every poll tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use crate::config::DEFAULT_POLL_INTERVAL_SECS;
use crate::errors::{OrchestratorError, SyncError, TransformError};
use crate::extractor::{Extractor, RowBatches};
use crate::loader::SearchLoader;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::transformer::Transformer;
use search_sync_repository::{SearchIndexError, SearchIndexProvider, WatermarkStore};
use search_sync_shared::{SearchDocument, StreamKind};

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Wall-clock interval between poll cycles.
    pub poll_interval: Duration,
    /// Backoff policy for index provisioning at startup.
    pub retry: RetryPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

/// Totals for one stream within a single poll cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    /// Batches loaded.
    pub batches: u64,
    /// Documents indexed.
    pub documents: u64,
}

/// Outcome of one poll cycle across all streams.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Documents indexed across all streams.
    pub documents_indexed: u64,
    /// Batches loaded across all streams.
    pub batches_loaded: u64,
    /// Streams whose sync failed this cycle; they retry next cycle.
    pub failed_streams: Vec<StreamKind>,
}

impl CycleReport {
    fn record(&mut self, stream: StreamKind, outcome: Result<StreamStats, SyncError>) {
        match outcome {
            Ok(stats) => {
                self.documents_indexed += stats.documents;
                self.batches_loaded += stats.batches;
            }
            Err(e) => {
                error!(
                    stream = %stream,
                    error = %e,
                    "Stream sync failed; watermark unchanged, retrying next cycle"
                );
                self.failed_streams.push(stream);
            }
        }
    }
}

/// Orchestrator that coordinates the sync components.
///
/// The orchestrator:
/// - Ensures each stream's index exists before the first cycle
/// - Reads each stream's watermark and drives its chain batch-by-batch
/// - Keeps stream failures isolated from each other and from the process
/// - Handles shutdown signals between cycles
pub struct Orchestrator {
    extractor: Extractor,
    transformer: Transformer,
    loader: SearchLoader,
    provider: Arc<dyn SearchIndexProvider>,
    watermarks: Arc<dyn WatermarkStore>,
    config: OrchestratorConfig,
    shutdown_tx: broadcast::Sender<()>,
    /// Total number of documents indexed since startup.
    total_documents_indexed: AtomicU64,
    /// Total number of poll cycles completed since startup.
    total_cycles_completed: AtomicU64,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(
        extractor: Extractor,
        transformer: Transformer,
        loader: SearchLoader,
        provider: Arc<dyn SearchIndexProvider>,
        watermarks: Arc<dyn WatermarkStore>,
    ) -> Self {
        Self::with_config(
            extractor,
            transformer,
            loader,
            provider,
            watermarks,
            OrchestratorConfig::default(),
        )
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        extractor: Extractor,
        transformer: Transformer,
        loader: SearchLoader,
        provider: Arc<dyn SearchIndexProvider>,
        watermarks: Arc<dyn WatermarkStore>,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            extractor,
            transformer,
            loader,
            provider,
            watermarks,
            config,
            shutdown_tx,
            total_documents_indexed: AtomicU64::new(0),
            total_cycles_completed: AtomicU64::new(0),
        }
    }

    /// Signal the run loop to stop after the current cycle.
    pub fn shutdown(&self) {
        info!("Shutdown requested");
        let _ = self.shutdown_tx.send(());
    }

    /// Total documents indexed since startup.
    pub fn total_documents_indexed(&self) -> u64 {
        self.total_documents_indexed.load(Ordering::Relaxed)
    }

    /// Total poll cycles completed since startup.
    pub fn total_cycles_completed(&self) -> u64 {
        self.total_cycles_completed.load(Ordering::Relaxed)
    }

    /// Run the orchestrator.
    ///
    /// Provisions the indices, then polls forever. Blocks until a shutdown
    /// signal or Ctrl-C is received; a cycle in progress always runs to
    /// completion first, so batches are never cancelled halfway.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), OrchestratorError> {
        info!("Starting catalog sync orchestrator");

        self.provision_indexes().await?;

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        // A cycle that overruns the interval skips the missed ticks instead
        // of bursting to catch up
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            "Starting sync loop"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                _ = shutdown_rx.recv() => {
                    info!("Orchestrator received shutdown signal");
                    break;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received interrupt, shutting down");
                    break;
                }
            }
        }

        info!(
            cycles = self.total_cycles_completed(),
            documents = self.total_documents_indexed(),
            "Sync loop stopped"
        );

        Ok(())
    }

    /// Run one poll cycle over all three streams.
    ///
    /// Stream failures are recorded in the report, never propagated; the
    /// failed stream's watermark is untouched and it retries next cycle.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        report.record(StreamKind::Works, self.sync_works().await);
        report.record(StreamKind::People, self.sync_people().await);
        report.record(StreamKind::Categories, self.sync_categories().await);

        self.total_documents_indexed
            .fetch_add(report.documents_indexed, Ordering::Relaxed);
        self.total_cycles_completed.fetch_add(1, Ordering::Relaxed);

        if report.failed_streams.is_empty() {
            info!(
                documents = report.documents_indexed,
                batches = report.batches_loaded,
                "Sync cycle complete"
            );
        } else {
            warn!(
                documents = report.documents_indexed,
                batches = report.batches_loaded,
                failed_streams = ?report.failed_streams,
                "Sync cycle completed with failures"
            );
        }

        report
    }

    /// Ensure every stream's index exists before syncing starts.
    ///
    /// Transient failures are retried with the shared policy; a persistent
    /// failure is fatal here, before any sync work has begun.
    async fn provision_indexes(&self) -> Result<(), OrchestratorError> {
        for stream in StreamKind::ALL {
            retry_with_backoff(
                &self.config.retry,
                "ensure index exists",
                || self.provider.ensure_index_exists(stream),
                SearchIndexError::is_transient,
            )
            .await
            .map_err(|e| OrchestratorError::provisioning(stream, e))?;

            info!(index = stream.index_name(), "Search index ready");
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn sync_works(&self) -> Result<StreamStats, SyncError> {
        let since = self.since(StreamKind::Works).await;
        let batches = self.extractor.open_works(since).await?;
        self.drain(StreamKind::Works, batches, Transformer::work_documents)
            .await
    }

    #[instrument(skip(self))]
    async fn sync_people(&self) -> Result<StreamStats, SyncError> {
        let since = self.since(StreamKind::People).await;
        let batches = self.extractor.open_people(since).await?;
        self.drain(StreamKind::People, batches, Transformer::person_documents)
            .await
    }

    #[instrument(skip(self))]
    async fn sync_categories(&self) -> Result<StreamStats, SyncError> {
        let since = self.since(StreamKind::Categories).await;
        let batches = self.extractor.open_categories(since).await?;
        self.drain(
            StreamKind::Categories,
            batches,
            Transformer::category_documents,
        )
        .await
    }

    /// Drive one opened stream to exhaustion: transform and load every
    /// batch in order, advancing the watermark batch by batch.
    async fn drain<R, D>(
        &self,
        stream: StreamKind,
        mut batches: RowBatches<'_, R>,
        transform: fn(&Transformer, Vec<R>) -> Result<Vec<D>, TransformError>,
    ) -> Result<StreamStats, SyncError>
    where
        R: Send,
        D: SearchDocument,
    {
        let mut stats = StreamStats::default();

        while let Some(rows) = batches.next_batch().await? {
            let documents = transform(&self.transformer, rows)?;
            self.loader.load(stream, &documents).await?;

            stats.batches += 1;
            stats.documents += documents.len() as u64;
        }

        if stats.batches > 0 {
            info!(
                stream = %stream,
                documents = stats.documents,
                batches = stats.batches,
                "Stream synced"
            );
        } else {
            debug!(stream = %stream, "Stream already up to date");
        }

        Ok(stats)
    }

    /// The stream's current watermark, or the beginning of time when none
    /// has been recorded yet.
    async fn since(&self, stream: StreamKind) -> DateTime<Utc> {
        match self.watermarks.get(stream).await {
            Some(watermark) => watermark,
            None => {
                info!(stream = %stream, "No watermark found, syncing from the beginning");
                DateTime::<Utc>::UNIX_EPOCH
            }
        }
    }
}
