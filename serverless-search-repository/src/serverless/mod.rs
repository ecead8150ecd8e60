//! Search API implementation for serverless projects.
//!
//! The project's search endpoint speaks the same REST dialect as the
//! `opensearch` client for indices, bulk and search; the inference API is
//! reached through the client's raw `send`.

mod client;
mod queries;

pub use client::{ServerlessSearchClient, ServerlessSearchClientFactory};
pub use queries::build_semantic_query;
