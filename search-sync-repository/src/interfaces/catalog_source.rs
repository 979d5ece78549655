//! Catalog source trait definition.
//!
//! This module defines the abstract interface over the relational system of
//! record. Each stream of the pipeline pulls its rows through one of these
//! methods.

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use crate::errors::SourceError;
use crate::types::{CategoryRow, PersonRow, WorkRow};

/// A lazily evaluated stream of rows for one entity kind.
pub type RowStream<'a, R> = BoxStream<'a, Result<R, SourceError>>;

/// Abstracts the relational source of catalog data.
///
/// Each method issues one parametrized query selecting rows with
/// `modified > since`, ordered ascending by `modified`, and returns them as a
/// lazy stream so callers can page the result set into bounded batches
/// without materializing it. The ascending order is load-bearing: the loader
/// takes the last row of each batch as the stream's new watermark.
///
/// Implementations are injected into the extractor, which also makes testing
/// with in-memory sources straightforward.
pub trait CatalogSource: Send + Sync {
    /// Stream works modified after `since`, with their embedded category and
    /// person snapshots pre-aggregated by the source.
    fn stream_works(&self, since: DateTime<Utc>) -> RowStream<'_, WorkRow>;

    /// Stream people modified after `since`, with their per-work role sets
    /// pre-aggregated by the source.
    fn stream_people(&self, since: DateTime<Utc>) -> RowStream<'_, PersonRow>;

    /// Stream categories modified after `since`.
    fn stream_categories(&self, since: DateTime<Utc>) -> RowStream<'_, CategoryRow>;
}
