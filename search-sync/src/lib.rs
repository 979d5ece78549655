//! # Search Sync
//!
//! Incremental sync pipeline for the movie catalog - polls PostgreSQL for
//! rows changed since the last run and indexes them into OpenSearch.
//!
//! ## Architecture
//!
//! The pipeline follows the Extractor-Transformer-Loader pattern, run once
//! per stream (works, people, categories) on every poll cycle:
//!
//! 1. **Extractor**: Streams changed rows from PostgreSQL in bounded batches
//! 2. **Transformer**: Validates rows and shapes them into search documents
//! 3. **Loader**: Bulk-upserts documents and advances the stream watermark
//! 4. **Orchestrator**: Drives the three streams on a fixed poll interval
//!
//! Watermarks live in a flat JSON state file, so a restarted process resumes
//! from the last fully indexed row instead of re-syncing everything.
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`extractor`]: Watermark-driven batched extraction
//! - [`transformer`]: Row validation and document shaping
//! - [`loader`]: Bulk upsert and watermark advancement
//! - [`orchestrator`]: Poll loop, index provisioning, shutdown
//! - [`retry`]: Shared backoff policy and retry helper
//! - [`errors`]: Error types for the pipeline

pub mod config;
pub mod errors;
pub mod extractor;
pub mod loader;
pub mod orchestrator;
pub mod retry;
pub mod transformer;

pub use config::Dependencies;
pub use errors::SyncError;

use errors::OrchestratorError;
use thiserror::Error;

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Orchestrator error.
    #[error("Orchestrator error: {0}")]
    OrchestratorError(#[from] OrchestratorError),
}

impl ServiceError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
