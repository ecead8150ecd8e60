//! # Serverless Search Repository
//!
//! This crate provides traits and implementations for the two remote APIs the
//! bootstrap workflow talks to: the project control API (create, status,
//! delete) and the search API of a provisioned project (inference endpoint,
//! index creation, bulk indexing, semantic search).

pub mod control;
pub mod errors;
pub mod interfaces;
pub mod schema;
pub mod serverless;
pub mod types;

pub use control::ServerlessControlClient;
pub use errors::{ProvisioningError, SearchError};
pub use interfaces::{ControlPlaneClient, SearchClientFactory, SearchEngineClient};
pub use schema::{AzureOpenAiSettings, FieldMapping, IndexMapping, InferenceEndpoint};
pub use serverless::{ServerlessSearchClient, ServerlessSearchClientFactory};
pub use types::{BulkDocument, BulkIndexSummary, DocumentOutcome};
