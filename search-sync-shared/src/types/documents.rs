//! Denormalized document types for the search index.
//!
//! These structs are the shapes actually stored in the search engine, one
//! per entity stream. Embedded people and categories are snapshots taken at
//! sync time, not live references; the relational trigger layer bumps
//! `modified` on the owning work whenever an embedded entity changes, so the
//! works stream re-denormalizes them on its own schedule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Behavior shared by every document the pipeline can index.
///
/// The loader uses `document_id` as the upsert key and `modified` of the last
/// document in a batch as the stream's new watermark.
pub trait SearchDocument: Serialize + Send + Sync {
    /// Identifier used as the document id in the search index.
    fn document_id(&self) -> Uuid;

    /// Source-side modification timestamp.
    fn modified(&self) -> DateTime<Utc>;
}

/// A category snapshot embedded in a work document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
}

/// A person snapshot embedded in a work document's role lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonRef {
    pub id: Uuid,
    pub name: String,
}

/// A work a person participated in, with their role labels on that work.
///
/// `roles` holds the set of role labels (actor/writer/director); an entry
/// with no roles is never emitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilmRoles {
    pub id: Uuid,
    pub roles: Vec<String>,
}

/// Document representation of a film work.
///
/// `rating` stays optional and serializes as JSON `null` when absent, so the
/// indexed field is always present and range queries behave uniformly.
/// Nested collections default to empty, never null, so index-side array
/// operations are always defined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkDocument {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub rating: Option<f64>,
    pub modified: DateTime<Utc>,
    pub categories: Vec<CategoryRef>,
    pub directors: Vec<PersonRef>,
    pub actors: Vec<PersonRef>,
    pub writers: Vec<PersonRef>,
}

/// Document representation of a person, with the works they participated in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonDocument {
    pub id: Uuid,
    pub full_name: String,
    pub modified: DateTime<Utc>,
    pub films: Vec<FilmRoles>,
}

/// Document representation of a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryDocument {
    pub id: Uuid,
    pub name: String,
    pub modified: DateTime<Utc>,
}

impl SearchDocument for WorkDocument {
    fn document_id(&self) -> Uuid {
        self.id
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }
}

impl SearchDocument for PersonDocument {
    fn document_id(&self) -> Uuid {
        self.id
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }
}

impl SearchDocument for CategoryDocument {
    fn document_id(&self) -> Uuid {
        self.id
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_work() -> WorkDocument {
        WorkDocument {
            id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
            title: "The Test".to_string(),
            description: "A work about testing".to_string(),
            rating: None,
            modified: "2024-01-03T00:00:00Z".parse().unwrap(),
            categories: vec![CategoryRef {
                id: Uuid::new_v4(),
                name: "Drama".to_string(),
            }],
            directors: vec![],
            actors: vec![PersonRef {
                id: Uuid::new_v4(),
                name: "Jane Doe".to_string(),
            }],
            writers: vec![],
        }
    }

    #[test]
    fn test_work_document_id_and_modified() {
        let work = sample_work();
        assert_eq!(work.document_id(), work.id);
        assert_eq!(work.modified(), work.modified);
    }

    #[test]
    fn test_missing_rating_serializes_as_null() {
        let work = sample_work();
        let json = serde_json::to_value(&work).unwrap();

        // The field must be present and null, not omitted.
        assert!(json.get("rating").is_some());
        assert!(json["rating"].is_null());
    }

    #[test]
    fn test_empty_nested_collections_serialize_as_arrays() {
        let work = sample_work();
        let json = serde_json::to_value(&work).unwrap();

        assert!(json["directors"].as_array().unwrap().is_empty());
        assert!(json["writers"].as_array().unwrap().is_empty());
        assert_eq!(json["actors"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_work_document_round_trip() {
        let work = sample_work();
        let json = serde_json::to_string(&work).unwrap();
        let back: WorkDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(work, back);
    }

    #[test]
    fn test_person_document_round_trip() {
        let person = PersonDocument {
            id: Uuid::new_v4(),
            full_name: "Jane Doe".to_string(),
            modified: "2024-01-02T12:30:00Z".parse().unwrap(),
            films: vec![FilmRoles {
                id: Uuid::new_v4(),
                roles: vec!["actor".to_string(), "director".to_string()],
            }],
        };

        let json = serde_json::to_string(&person).unwrap();
        let back: PersonDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(person, back);
    }

    #[test]
    fn test_category_document_fields() {
        let category = CategoryDocument {
            id: Uuid::new_v4(),
            name: "Comedy".to_string(),
            modified: Utc::now(),
        };

        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json["name"], "Comedy");
        assert_eq!(category.document_id(), category.id);
    }
}
