//! Row and request/response types exchanged with the external systems.
//!
//! Raw rows keep every scalar field optional: whether a missing value is
//! acceptable is a transformation decision, not a database decode failure.
//! Nested aggregates stay as raw JSON for the same reason.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// A raw work row as returned by the catalog source.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkRow {
    pub id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub modified: Option<DateTime<Utc>>,
    /// JSON array of `{id, name}` category snapshots.
    pub categories: Option<Value>,
    /// JSON array of `{id, name}` person snapshots, one array per role.
    pub directors: Option<Value>,
    pub actors: Option<Value>,
    pub writers: Option<Value>,
}

/// A raw person row as returned by the catalog source.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PersonRow {
    pub id: Option<Uuid>,
    pub full_name: Option<String>,
    pub modified: Option<DateTime<Utc>>,
    /// JSON array of `{id, roles}` entries, one per work the person
    /// participated in.
    pub films: Option<Value>,
}

/// A raw category row as returned by the catalog source.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub modified: Option<DateTime<Utc>>,
}

/// One document to upsert through the bulk API.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertAction {
    /// Document id in the target index.
    pub id: String,
    /// Full document body; replaces any existing document with the same id.
    pub source: Value,
}

/// Outcome of one bulk upsert call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkSummary {
    /// Number of actions submitted.
    pub total: usize,
    /// Number of documents the index accepted.
    pub succeeded: usize,
    /// Number of documents the index rejected.
    pub failed: usize,
    /// Per-document failures inside an otherwise successful call.
    pub errors: Vec<BulkItemError>,
}

/// A single rejected item reported by the bulk API.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemError {
    pub id: String,
    pub status: u16,
    pub reason: String,
}
