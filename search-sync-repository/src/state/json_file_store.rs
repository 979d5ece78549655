//! Flat JSON file watermark store.
//!
//! Watermarks are kept in a single JSON object mapping stream keys to
//! RFC 3339 timestamps:
//!
//! ```json
//! {
//!   "last_works_updated": "2024-05-14T10:30:00+00:00",
//!   "last_people_updated": "2024-05-14T10:29:12+00:00"
//! }
//! ```
//!
//! A missing or unparsable file degrades to an empty state with a warning,
//! so the sync falls back to a full re-sync rather than refusing to start.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use search_sync_shared::StreamKind;

use crate::errors::WatermarkStoreError;
use crate::interfaces::WatermarkStore;

/// File-backed watermark store.
pub struct JsonFileWatermarkStore {
    path: PathBuf,
    // Serializes read-modify-write cycles so concurrent sets cannot drop keys
    lock: Mutex<()>,
}

impl JsonFileWatermarkStore {
    /// Create a store backed by the file at `path`.
    ///
    /// The file is not touched here; it is created on the first `set`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_state(path: &Path) -> HashMap<String, String> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "State file unreadable, starting from empty state");
                return HashMap::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "State file corrupt, starting from empty state");
                HashMap::new()
            }
        }
    }

    async fn write_state(
        &self,
        state: &HashMap<String, String>,
    ) -> Result<(), WatermarkStoreError> {
        let serialized = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&self.path, serialized).await?;
        Ok(())
    }
}

#[async_trait]
impl WatermarkStore for JsonFileWatermarkStore {
    async fn get(&self, stream: StreamKind) -> Option<DateTime<Utc>> {
        let _guard = self.lock.lock().await;
        let state = Self::read_state(&self.path).await;

        let raw = state.get(stream.watermark_key())?;

        match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => Some(parsed.with_timezone(&Utc)),
            Err(e) => {
                warn!(
                    key = stream.watermark_key(),
                    value = %raw,
                    error = %e,
                    "Stored watermark is not a valid timestamp, treating stream as never synced"
                );
                None
            }
        }
    }

    async fn set(
        &self,
        stream: StreamKind,
        watermark: DateTime<Utc>,
    ) -> Result<(), WatermarkStoreError> {
        let _guard = self.lock.lock().await;

        let mut state = Self::read_state(&self.path).await;
        state.insert(stream.watermark_key().to_string(), watermark.to_rfc3339());
        self.write_state(&state).await?;

        debug!(key = stream.watermark_key(), watermark = %watermark, "Watermark persisted");
        Ok(())
    }
}
