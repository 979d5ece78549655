//! # Search Sync Shared
//!
//! This crate defines the shared data structures used across the catalog search
//! sync pipeline: the three denormalized document types, the nested snapshot
//! types they embed, and the stream definitions.

pub mod types;

pub use types::documents::{
    CategoryDocument, CategoryRef, FilmRoles, PersonDocument, PersonRef, SearchDocument,
    WorkDocument,
};
pub use types::stream::StreamKind;
