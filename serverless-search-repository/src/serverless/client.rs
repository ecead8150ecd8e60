//! Serverless search client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! on top of the `opensearch` transport.

use std::sync::Arc;

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    http::{
        headers::HeaderMap,
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
        Method,
    },
    indices::{IndicesCreateParts, IndicesRefreshParts},
    BulkParts, OpenSearch, SearchParts,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::errors::SearchError;
use crate::interfaces::{SearchClientFactory, SearchEngineClient};
use crate::schema::{IndexMapping, InferenceEndpoint};
use crate::serverless::queries::{build_bulk_lines, build_semantic_query};
use crate::types::{BulkDocument, BulkIndexSummary, DocumentOutcome};
use serverless_search_shared::{ProjectDescriptor, SearchHit, SemanticQuery};

/// Search client bound to one provisioned project.
///
/// # Example
///
/// ```ignore
/// let client = ServerlessSearchClient::connect(
///     &project.endpoints.elasticsearch,
///     Credentials::Basic(user, password),
/// )?;
/// client.create_index("news", &IndexMapping::news_articles("embeddings")).await?;
/// ```
pub struct ServerlessSearchClient {
    client: OpenSearch,
}

impl ServerlessSearchClient {
    /// Create a client for the search endpoint at `url`.
    ///
    /// # Arguments
    ///
    /// * `url` - The project's search endpoint
    /// * `credentials` - Credentials attached to every request
    ///
    /// # Returns
    ///
    /// * `Ok(ServerlessSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If the URL or transport setup is invalid
    pub fn connect(url: &str, credentials: Credentials) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .auth(credentials)
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        info!(url = %url, "Created search client");

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }

    async fn error_body(response: Response) -> String {
        response.text().await.unwrap_or_default()
    }

    /// Map a `_bulk` response onto per-document outcomes.
    ///
    /// Items are returned by the engine in request order.
    fn parse_bulk_response(
        documents: &[BulkDocument],
        body: &Value,
    ) -> Result<BulkIndexSummary, SearchError> {
        let items = body
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| SearchError::parse("bulk response has no items"))?;

        if items.len() != documents.len() {
            return Err(SearchError::parse(format!(
                "bulk response has {} items for {} documents",
                items.len(),
                documents.len()
            )));
        }

        let summary = documents
            .iter()
            .zip(items)
            .map(|(document, item)| {
                let action = item
                    .get("index")
                    .or_else(|| item.as_object().and_then(|o| o.values().next()))
                    .unwrap_or(item);

                match action.get("error") {
                    Some(err) => {
                        let reason = match (
                            err.get("type").and_then(Value::as_str),
                            err.get("reason").and_then(Value::as_str),
                        ) {
                            (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
                            (Some(kind), None) => kind.to_string(),
                            _ => err.to_string(),
                        };
                        DocumentOutcome::failed(document.line, reason)
                    }
                    None => DocumentOutcome::succeeded(
                        document.line,
                        action.get("_id").and_then(Value::as_str).map(str::to_string),
                    ),
                }
            })
            .collect();

        Ok(summary)
    }

    /// Extract hits from a search response.
    fn parse_hits(body: &Value) -> Result<Vec<SearchHit>, SearchError> {
        let hits = body
            .get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(Value::as_array)
            .ok_or_else(|| SearchError::parse("search response has no hits"))?;

        hits.iter().map(Self::parse_hit).collect()
    }

    /// A hit without `_index` or `_id` fails the whole response.
    fn parse_hit(hit: &Value) -> Result<SearchHit, SearchError> {
        let field = |name: &str| {
            hit.get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| SearchError::parse(format!("search hit has no {}: {}", name, hit)))
        };

        Ok(SearchHit {
            index: field("_index")?,
            id: field("_id")?,
            score: hit.get("_score").and_then(Value::as_f64),
            source: hit.get("_source").cloned().unwrap_or(Value::Null),
        })
    }
}

#[async_trait]
impl SearchEngineClient for ServerlessSearchClient {
    #[instrument(skip(self, endpoint), fields(inference_id = %endpoint.inference_id))]
    async fn create_inference_endpoint(
        &self,
        endpoint: &InferenceEndpoint,
    ) -> Result<(), SearchError> {
        let response = self
            .client
            .send(
                Method::Put,
                &endpoint.path(),
                HeaderMap::new(),
                Option::<&()>::None,
                Some(JsonBody::new(endpoint.to_body())),
                None,
            )
            .await
            .map_err(|e| SearchError::inference(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Inference endpoint creation failed");
            return Err(SearchError::inference(format!(
                "Inference endpoint creation failed with status {}: {}",
                status, error_body
            )));
        }

        info!("Inference endpoint created");
        Ok(())
    }

    #[instrument(skip(self, mapping))]
    async fn create_index(&self, index: &str, mapping: &IndexMapping) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(mapping.to_body())
            .send()
            .await
            .map_err(|e| SearchError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Index creation failed");
            return Err(SearchError::index_creation(format!(
                "Index creation failed with status {}: {}",
                status, error_body
            )));
        }

        info!(semantic_fields = ?mapping.semantic_fields(), "Index created");
        Ok(())
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn bulk_index(
        &self,
        index: &str,
        documents: &[BulkDocument],
    ) -> Result<BulkIndexSummary, SearchError> {
        if documents.is_empty() {
            return Ok(BulkIndexSummary::default());
        }

        let body: Vec<JsonBody<Value>> = build_bulk_lines(index, documents)
            .into_iter()
            .map(JsonBody::new)
            .collect();

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::bulk_index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchError::bulk_index(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let summary = Self::parse_bulk_response(documents, &response_body)?;
        if summary.failed > 0 {
            warn!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Bulk request had rejected documents"
            );
        } else {
            debug!(succeeded = summary.succeeded, "Bulk request indexed all documents");
        }

        Ok(summary)
    }

    #[instrument(skip(self))]
    async fn refresh(&self, index: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::refresh(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            return Err(SearchError::refresh(format!(
                "Refresh failed with status {}: {}",
                status, error_body
            )));
        }

        debug!("Index refreshed");
        Ok(())
    }

    #[instrument(skip(self, query), fields(index = %query.index, field = %query.field))]
    async fn semantic_search(&self, query: &SemanticQuery) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .search(SearchParts::Index(&[query.index.as_str()]))
            .body(build_semantic_query(query))
            .send()
            .await
            .map_err(|e| SearchError::query(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Search request failed");
            return Err(SearchError::query(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let hits = Self::parse_hits(&response_body)?;
        debug!(hits = hits.len(), "Search completed");
        Ok(hits)
    }
}

/// Connects `ServerlessSearchClient`s to projects using the basic-auth
/// credentials issued at creation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerlessSearchClientFactory;

impl SearchClientFactory for ServerlessSearchClientFactory {
    fn connect(
        &self,
        project: &ProjectDescriptor,
    ) -> Result<Arc<dyn SearchEngineClient>, SearchError> {
        let credentials = Credentials::Basic(
            project.credentials.username.clone(),
            project.credentials.password.clone(),
        );
        let client = ServerlessSearchClient::connect(&project.endpoints.elasticsearch, credentials)?;
        Ok(Arc::new(client))
    }
}
