//! # Search Sync Repository
//!
//! This crate provides traits and implementations for the infrastructure the
//! catalog search sync pipeline talks to: the relational system of record
//! (Postgres), the search index (OpenSearch) and the durable watermark state
//! file. The pipeline crate depends only on the trait seams, which keeps the
//! concrete backends swappable and the pipeline testable with in-memory
//! fakes.

pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod postgres;
pub mod state;
pub mod types;

pub use errors::{SearchIndexError, SourceError, WatermarkStoreError};
pub use interfaces::{CatalogSource, RowStream, SearchIndexProvider, WatermarkStore};
pub use opensearch::OpenSearchProvider;
pub use postgres::PostgresCatalogSource;
pub use state::JsonFileWatermarkStore;
pub use types::{BulkItemError, BulkSummary, CategoryRow, PersonRow, UpsertAction, WorkRow};
