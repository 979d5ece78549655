//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    BulkParts, OpenSearch,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use search_sync_shared::StreamKind;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config;
use crate::types::{BulkItemError, BulkSummary, UpsertAction};

/// OpenSearch provider implementation.
///
/// Bulk upserts use the `index` action, which fully replaces any existing
/// document with the same id - the relational source is the source of truth,
/// so a re-synced document always supersedes what the index held.
pub struct OpenSearchProvider {
    client: OpenSearch,
}

/// Bulk response body, reduced to the fields the summary needs.
#[derive(Debug, Deserialize)]
struct BulkResponseBody {
    errors: bool,
    #[serde(default)]
    items: Vec<BulkResponseItem>,
}

#[derive(Debug, Deserialize)]
struct BulkResponseItem {
    index: Option<BulkItemOutcome>,
}

#[derive(Debug, Deserialize)]
struct BulkItemOutcome {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(default)]
    status: u16,
    error: Option<BulkItemReason>,
}

#[derive(Debug, Deserialize)]
struct BulkItemReason {
    #[serde(rename = "type")]
    kind: String,
    reason: Option<String>,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider for the specified URL.
    ///
    /// Only the transport is built here; no request is sent, so this
    /// succeeds even while the search engine is still coming up.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If the URL is invalid or transport setup fails
    pub async fn new(url: &str) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch provider");

        Ok(Self { client })
    }

    /// Interleave action and source lines the way the bulk endpoint expects.
    fn bulk_body(index: &str, actions: &[UpsertAction]) -> Vec<JsonBody<Value>> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(actions.len() * 2);

        for action in actions {
            body.push(json!({"index": {"_index": index, "_id": action.id}}).into());
            body.push(action.source.clone().into());
        }

        body
    }

    /// Reduce a parsed bulk response to counts and per-item errors.
    fn summarize(total: usize, response: BulkResponseBody) -> BulkSummary {
        if !response.errors {
            return BulkSummary {
                total,
                succeeded: total,
                failed: 0,
                errors: Vec::new(),
            };
        }

        let mut errors = Vec::new();
        for item in response.items {
            let Some(outcome) = item.index else { continue };
            if let Some(reason) = outcome.error {
                errors.push(BulkItemError {
                    id: outcome.id.unwrap_or_default(),
                    status: outcome.status,
                    reason: match reason.reason {
                        Some(detail) => format!("{}: {}", reason.kind, detail),
                        None => reason.kind,
                    },
                });
            }
        }

        BulkSummary {
            total,
            succeeded: total - errors.len(),
            failed: errors.len(),
            errors,
        }
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    async fn ensure_index_exists(&self, stream: StreamKind) -> Result<(), SearchIndexError> {
        let index = stream.index_name();

        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            debug!(index = %index, "Index already exists");
            return Ok(());
        }

        // Anything other than 404 means the check itself failed
        if status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Index existence check failed");
            return Err(SearchIndexError::connection(format!(
                "Index existence check failed with status {}: {}",
                status, error_body
            )));
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(index_config::index_settings(stream))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Index creation failed");

            if status.is_server_error() {
                return Err(SearchIndexError::connection(format!(
                    "Create index {} failed with status {}: {}",
                    index, status, error_body
                )));
            }
            return Err(SearchIndexError::index_creation(format!(
                "Create index {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Index created");
        Ok(())
    }

    async fn bulk_upsert(
        &self,
        stream: StreamKind,
        actions: &[UpsertAction],
    ) -> Result<BulkSummary, SearchIndexError> {
        if actions.is_empty() {
            return Ok(BulkSummary::default());
        }

        let index = stream.index_name();
        let body = Self::bulk_body(index, actions);

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_request(status.as_u16(), error_body));
        }

        let response_body: BulkResponseBody = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Ok(Self::summarize(actions.len(), response_body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(id: &str) -> UpsertAction {
        UpsertAction {
            id: id.to_string(),
            source: json!({"id": id, "title": "Test"}),
        }
    }

    #[test]
    fn test_bulk_body_interleaves_action_and_source_lines() {
        let actions = vec![action("a"), action("b")];
        let body = OpenSearchProvider::bulk_body("works", &actions);

        assert_eq!(body.len(), 4);
    }

    #[test]
    fn test_summarize_clean_response() {
        let response: BulkResponseBody = serde_json::from_value(json!({
            "took": 12,
            "errors": false,
            "items": [
                {"index": {"_index": "works", "_id": "a", "status": 201, "result": "created"}},
                {"index": {"_index": "works", "_id": "b", "status": 200, "result": "updated"}}
            ]
        }))
        .unwrap();

        let summary = OpenSearchProvider::summarize(2, response);

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
        assert!(summary.errors.is_empty());
    }

    #[test]
    fn test_summarize_partial_failure() {
        let response: BulkResponseBody = serde_json::from_value(json!({
            "took": 8,
            "errors": true,
            "items": [
                {"index": {"_index": "works", "_id": "a", "status": 200, "result": "updated"}},
                {"index": {"_index": "works", "_id": "b", "status": 400, "error": {
                    "type": "mapper_parsing_exception",
                    "reason": "failed to parse field [rating]"
                }}}
            ]
        }))
        .unwrap();

        let summary = OpenSearchProvider::summarize(2, response);

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors[0].id, "b");
        assert_eq!(summary.errors[0].status, 400);
        assert!(summary.errors[0].reason.contains("mapper_parsing_exception"));
    }

    #[test]
    fn test_summarize_error_without_reason_detail() {
        let response: BulkResponseBody = serde_json::from_value(json!({
            "errors": true,
            "items": [
                {"index": {"_id": "x", "status": 429, "error": {"type": "es_rejected_execution_exception"}}}
            ]
        }))
        .unwrap();

        let summary = OpenSearchProvider::summarize(1, response);

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors[0].reason, "es_rejected_execution_exception");
    }
}
