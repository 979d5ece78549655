//! Dependency initialization and wiring for the sync service.

use std::sync::Arc;

use tracing::info;

use crate::config::Settings;
use crate::extractor::Extractor;
use crate::loader::SearchLoader;
use crate::orchestrator::{Orchestrator, OrchestratorConfig};
use crate::transformer::Transformer;
use crate::ServiceError;
use search_sync_repository::{
    CatalogSource, JsonFileWatermarkStore, OpenSearchProvider, PostgresCatalogSource,
    SearchIndexProvider, WatermarkStore,
};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// Construction is IO-free: the database pool is lazy and the search
    /// client only builds its transport, so a source or index that is still
    /// coming up degrades to startup retries instead of failing here.
    pub async fn new() -> Result<Self, ServiceError> {
        Self::with_settings(Settings::from_env()).await
    }

    /// Initialize all dependencies from explicit settings.
    pub async fn with_settings(settings: Settings) -> Result<Self, ServiceError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            state_file_path = %settings.state_file_path,
            poll_interval_secs = settings.poll_interval.as_secs(),
            batch_size = settings.batch_size,
            "Initializing dependencies"
        );

        let source: Arc<dyn CatalogSource> = Arc::new(
            PostgresCatalogSource::new(&settings.database_url).map_err(|e| {
                ServiceError::config(format!("Failed to create database pool: {}", e))
            })?,
        );

        let provider: Arc<dyn SearchIndexProvider> = Arc::new(
            OpenSearchProvider::new(&settings.opensearch_url)
                .await
                .map_err(|e| {
                    ServiceError::config(format!("Failed to create OpenSearch provider: {}", e))
                })?,
        );

        let watermarks: Arc<dyn WatermarkStore> =
            Arc::new(JsonFileWatermarkStore::new(&settings.state_file_path));

        let extractor = Extractor::new(source, settings.batch_size);
        let transformer = Transformer::new();
        let loader = SearchLoader::new(Arc::clone(&provider), Arc::clone(&watermarks));

        let orchestrator = Orchestrator::with_config(
            extractor,
            transformer,
            loader,
            provider,
            watermarks,
            OrchestratorConfig {
                poll_interval: settings.poll_interval,
                ..OrchestratorConfig::default()
            },
        );

        Ok(Self { orchestrator })
    }
}
