//! Trait seams for the infrastructure the sync pipeline depends on.
//!
//! The pipeline components are written against these traits; concrete
//! backends (Postgres, OpenSearch, the JSON state file) implement them, and
//! tests substitute in-memory fakes.

mod catalog_source;
mod search_index_provider;
mod watermark_store;

pub use catalog_source::{CatalogSource, RowStream};
pub use search_index_provider::SearchIndexProvider;
pub use watermark_store::WatermarkStore;
