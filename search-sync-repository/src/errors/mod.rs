//! Error types for the search sync repository.
//!
//! One error type per backend, so the pipeline can classify failures
//! (retryable connection trouble vs. data errors) per component.

mod search_index_error;
mod source_error;
mod watermark_store_error;

pub use search_index_error::SearchIndexError;
pub use source_error::SourceError;
pub use watermark_store_error::WatermarkStoreError;
