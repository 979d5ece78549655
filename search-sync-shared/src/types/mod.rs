//! This module defines the core data structures shared across the sync pipeline.
//! It re-exports the document types and the `StreamKind` enum.

pub mod documents;
pub mod stream;

pub use documents::{
    CategoryDocument, CategoryRef, FilmRoles, PersonDocument, PersonRef, SearchDocument,
    WorkDocument,
};
pub use stream::StreamKind;
