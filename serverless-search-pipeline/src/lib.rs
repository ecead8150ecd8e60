//! # Serverless Search Pipeline
//!
//! This crate provides the workflow that bootstraps a semantic-search
//! project end to end.
//!
//! ## Architecture
//!
//! 1. **Readiness**: Polls the control API until a new project is usable
//! 2. **Loader**: Streams newline-delimited records into the search index
//! 3. **Orchestrator**: Sequences create, ready, configure, load, query and
//!    delete, and applies the cleanup policy when a step fails

pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod readiness;

#[cfg(test)]
mod testing;

pub use errors::WorkflowError;
pub use loader::{BulkLoader, LoaderConfig};
pub use orchestrator::{
    CleanupPolicy, Orchestrator, OrchestratorConfig, QueryPlan, WorkflowPlan, WorkflowReport,
    WorkflowState,
};
pub use readiness::{ReadinessConfig, ReadinessOutcome, ReadinessPoller};
