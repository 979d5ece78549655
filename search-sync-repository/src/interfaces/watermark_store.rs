//! Watermark store trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use search_sync_shared::StreamKind;

use crate::errors::WatermarkStoreError;

/// Durable storage for per-stream sync watermarks.
///
/// A watermark is the latest `modified` timestamp known to be fully indexed
/// for a stream. A single pipeline process owns the store. Each stream owns a
/// disjoint key, so implementations only need to serialize access to the
/// shared backing state, not coordinate between streams.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Read the stored watermark for a stream.
    ///
    /// Returns `None` when no watermark has been stored yet, and also when
    /// the backing state cannot be read or parsed - callers treat `None` as
    /// "beginning of time" and resync from the epoch, which is safe because
    /// loads are idempotent. Unreadable state is logged, never raised.
    async fn get(&self, stream: StreamKind) -> Option<DateTime<Utc>>;

    /// Persist the watermark for a stream.
    ///
    /// Called by the loader only after the corresponding batch was durably
    /// indexed. A failed write is a real error: the batch must not count as
    /// synced, otherwise the pipeline would silently re-deliver it forever.
    async fn set(
        &self,
        stream: StreamKind,
        watermark: DateTime<Utc>,
    ) -> Result<(), WatermarkStoreError>;
}
