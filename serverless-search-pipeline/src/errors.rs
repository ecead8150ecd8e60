//! Error types for the bootstrap workflow.

use std::time::Duration;

use serverless_search_repository::{ProvisioningError, SearchError};
use serverless_search_shared::ProjectPhase;
use thiserror::Error;

/// Errors that can end a workflow run.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Error from the project control API.
    #[error("Provisioning error: {0}")]
    Provisioning(#[from] ProvisioningError),

    /// Error from the search or inference API.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// The project did not become ready within the configured bounds.
    #[error("Project {project_id} not ready after {attempts} status checks ({elapsed:?}), last phase: {}", phase_label(.last_phase))]
    ReadinessTimedOut {
        project_id: String,
        attempts: u32,
        elapsed: Duration,
        last_phase: Option<ProjectPhase>,
    },

    /// The run was cancelled before it completed.
    #[error("Workflow cancelled")]
    Cancelled,

    /// Reading the input dataset failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn phase_label(phase: &Option<ProjectPhase>) -> &str {
    phase.as_ref().map(ProjectPhase::as_str).unwrap_or("unknown")
}
