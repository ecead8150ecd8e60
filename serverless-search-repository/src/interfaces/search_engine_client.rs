//! Search engine client trait definition.
//!
//! This module defines the abstract interface for the operations issued
//! against a provisioned project once it is ready.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::schema::{IndexMapping, InferenceEndpoint};
use crate::types::{BulkDocument, BulkIndexSummary};
use serverless_search_shared::{ProjectDescriptor, SearchHit, SemanticQuery};

/// Abstract interface for search engine operations.
///
/// # Ordering
///
/// The client does not enforce ordering between calls. An inference endpoint
/// must be created before an index mapping that references it, and the index
/// before documents are loaded into it. That sequencing is the caller's job.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Declare a named inference endpoint.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the endpoint was created
    /// * `Err(SearchError::InferenceError)` - If the provider rejected it
    async fn create_inference_endpoint(&self, endpoint: &InferenceEndpoint)
        -> Result<(), SearchError>;

    /// Create an index with the given mapping.
    ///
    /// No pre-existence check is made: creating an index that already exists
    /// fails with the provider's error.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchError::IndexCreationError)` - If creation fails
    async fn create_index(&self, index: &str, mapping: &IndexMapping) -> Result<(), SearchError>;

    /// Index a batch of documents in a single bulk request.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkIndexSummary)` - One outcome per document, including rejected ones
    /// * `Err(SearchError::BulkIndexError)` - If the request failed as a whole
    async fn bulk_index(
        &self,
        index: &str,
        documents: &[BulkDocument],
    ) -> Result<BulkIndexSummary, SearchError>;

    /// Make all indexed documents visible to search.
    async fn refresh(&self, index: &str) -> Result<(), SearchError>;

    /// Run a semantic similarity query.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<SearchHit>)` - Up to `query.size` hits, best first
    /// * `Err(SearchError)` - If the search fails
    async fn semantic_search(&self, query: &SemanticQuery) -> Result<Vec<SearchHit>, SearchError>;
}

/// Builds a search client bound to a provisioned project.
pub trait SearchClientFactory: Send + Sync {
    /// Connect to the search endpoint of `project` using its credentials.
    fn connect(&self, project: &ProjectDescriptor)
        -> Result<Arc<dyn SearchEngineClient>, SearchError>;
}
