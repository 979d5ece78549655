//! OpenSearch implementation of the search index provider.

pub mod index_config;
mod provider;

pub use provider::OpenSearchProvider;
