//! Postgres implementation of the catalog source.

mod queries;
mod source;

pub use source::PostgresCatalogSource;
