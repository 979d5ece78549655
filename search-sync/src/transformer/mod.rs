//! Row validation and document shaping.
//!
//! Transforms raw rows from the system of record into typed search
//! documents. Validation is fail-fast per batch: one bad row fails the
//! whole batch, the watermark stays put, and the batch is re-extracted on
//! the next cycle. A partially indexed batch is worse than a stalled one.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::errors::TransformError;
use search_sync_repository::{CategoryRow, PersonRow, WorkRow};
use search_sync_shared::{
    CategoryDocument, CategoryRef, FilmRoles, PersonDocument, PersonRef, WorkDocument,
};

const WORK: &str = "work";
const PERSON: &str = "person";
const CATEGORY: &str = "category";

/// Transformer turning raw rows into validated search documents.
///
/// The transformer is responsible for:
/// - Enforcing required fields (`id`, `modified`, and the entity's naming fields)
/// - Mapping optional scalars to `None` rather than dropping the row
/// - Normalizing nested aggregates (absent or null becomes empty, never null)
pub struct Transformer;

impl Transformer {
    /// Create a new transformer.
    pub fn new() -> Self {
        Self
    }

    /// Transform a batch of work rows.
    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    pub fn work_documents(&self, rows: Vec<WorkRow>) -> Result<Vec<WorkDocument>, TransformError> {
        let documents = rows
            .into_iter()
            .map(Self::work_document)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(document_count = documents.len(), "Transformed work batch");
        Ok(documents)
    }

    /// Transform a batch of person rows.
    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    pub fn person_documents(
        &self,
        rows: Vec<PersonRow>,
    ) -> Result<Vec<PersonDocument>, TransformError> {
        let documents = rows
            .into_iter()
            .map(Self::person_document)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(document_count = documents.len(), "Transformed person batch");
        Ok(documents)
    }

    /// Transform a batch of category rows.
    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    pub fn category_documents(
        &self,
        rows: Vec<CategoryRow>,
    ) -> Result<Vec<CategoryDocument>, TransformError> {
        let documents = rows
            .into_iter()
            .map(Self::category_document)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(document_count = documents.len(), "Transformed category batch");
        Ok(documents)
    }

    fn work_document(row: WorkRow) -> Result<WorkDocument, TransformError> {
        Ok(WorkDocument {
            id: row.id.ok_or_else(|| TransformError::missing(WORK, "id"))?,
            title: row
                .title
                .ok_or_else(|| TransformError::missing(WORK, "title"))?,
            description: row
                .description
                .ok_or_else(|| TransformError::missing(WORK, "description"))?,
            rating: row.rating,
            modified: row
                .modified
                .ok_or_else(|| TransformError::missing(WORK, "modified"))?,
            categories: Self::nested_refs::<CategoryRef>(WORK, "categories", row.categories)?,
            directors: Self::nested_refs::<PersonRef>(WORK, "directors", row.directors)?,
            actors: Self::nested_refs::<PersonRef>(WORK, "actors", row.actors)?,
            writers: Self::nested_refs::<PersonRef>(WORK, "writers", row.writers)?,
        })
    }

    fn person_document(row: PersonRow) -> Result<PersonDocument, TransformError> {
        Ok(PersonDocument {
            id: row.id.ok_or_else(|| TransformError::missing(PERSON, "id"))?,
            full_name: row
                .full_name
                .ok_or_else(|| TransformError::missing(PERSON, "full_name"))?,
            modified: row
                .modified
                .ok_or_else(|| TransformError::missing(PERSON, "modified"))?,
            films: Self::film_roles(row.films),
        })
    }

    fn category_document(row: CategoryRow) -> Result<CategoryDocument, TransformError> {
        Ok(CategoryDocument {
            id: row.id.ok_or_else(|| TransformError::missing(CATEGORY, "id"))?,
            name: row
                .name
                .ok_or_else(|| TransformError::missing(CATEGORY, "name"))?,
            modified: row
                .modified
                .ok_or_else(|| TransformError::missing(CATEGORY, "modified"))?,
        })
    }

    /// Parse a strict nested aggregate. Absent or null means empty; a
    /// malformed entry fails the batch, same as a missing scalar field.
    fn nested_refs<T: DeserializeOwned>(
        entity: &'static str,
        field: &'static str,
        value: Option<Value>,
    ) -> Result<Vec<T>, TransformError> {
        match value {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value)
                .map_err(|e| TransformError::invalid(entity, field, e.to_string())),
        }
    }

    /// Parse the person films aggregate. This one is lenient: malformed
    /// entries and entries without roles are skipped individually, because
    /// the films list is auxiliary denormalization and must not stall the
    /// person stream.
    fn film_roles(value: Option<Value>) -> Vec<FilmRoles> {
        let entries = match value {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                warn!(value = %other, "Films aggregate is not an array, dropping it");
                return Vec::new();
            }
        };

        let mut films = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<FilmRoles>(entry) {
                Ok(film) if film.roles.is_empty() => {
                    debug!(film_id = %film.id, "Skipping film entry with no roles");
                }
                Ok(film) => films.push(film),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed film entry");
                }
            }
        }

        films
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}
