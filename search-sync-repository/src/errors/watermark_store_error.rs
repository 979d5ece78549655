//! Watermark store error types.

use thiserror::Error;

/// Errors raised while persisting watermarks.
///
/// Only writes produce these: a failed watermark write fails the batch so it
/// is retried, while read problems degrade to "no checkpoint" inside the
/// store itself (resyncing from the epoch is always safe, losing a write
/// silently is not).
#[derive(Debug, Error)]
pub enum WatermarkStoreError {
    /// Reading or writing the state file failed.
    #[error("State file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the state map failed.
    #[error("State serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
