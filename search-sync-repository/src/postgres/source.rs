//! Postgres-backed catalog source.

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::queries;
use crate::errors::SourceError;
use crate::interfaces::{CatalogSource, RowStream};
use crate::types::{CategoryRow, PersonRow, WorkRow};

/// Default connection pool size.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Catalog source backed by the platform's Postgres database.
///
/// Queries are executed through `fetch`, so rows stream from the server
/// instead of being collected; the extractor chunks them into batches.
pub struct PostgresCatalogSource {
    pool: PgPool,
}

impl PostgresCatalogSource {
    /// Create a source with a lazily connecting pool.
    ///
    /// No connection is attempted here. A source outage surfaces on the
    /// first query of a poll tick, where the extractor's retry policy owns
    /// it, so the process can start while the database is down.
    pub fn new(database_url: &str) -> Result<Self, SourceError> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Create a source from an existing pool.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CatalogSource for PostgresCatalogSource {
    fn stream_works(&self, since: DateTime<Utc>) -> RowStream<'_, WorkRow> {
        Box::pin(
            sqlx::query_as::<_, WorkRow>(queries::SELECT_UPDATED_WORKS)
                .bind(since)
                .fetch(&self.pool)
                .map_err(SourceError::from),
        )
    }

    fn stream_people(&self, since: DateTime<Utc>) -> RowStream<'_, PersonRow> {
        Box::pin(
            sqlx::query_as::<_, PersonRow>(queries::SELECT_UPDATED_PEOPLE)
                .bind(since)
                .fetch(&self.pool)
                .map_err(SourceError::from),
        )
    }

    fn stream_categories(&self, since: DateTime<Utc>) -> RowStream<'_, CategoryRow> {
        Box::pin(
            sqlx::query_as::<_, CategoryRow>(queries::SELECT_UPDATED_CATEGORIES)
                .bind(since)
                .fetch(&self.pool)
                .map_err(SourceError::from),
        )
    }
}
