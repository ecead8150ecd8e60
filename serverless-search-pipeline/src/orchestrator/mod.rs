//! Orchestrator module for the bootstrap pipeline.
//!
//! Drives one project through create, ready, configure, load, query and
//! delete, strictly in that order.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::errors::WorkflowError;
use crate::loader::{BulkLoader, LoaderConfig};
use crate::readiness::{ReadinessConfig, ReadinessOutcome, ReadinessPoller};
use serverless_search_repository::{
    BulkIndexSummary, ControlPlaneClient, IndexMapping, InferenceEndpoint, SearchClientFactory,
};
use serverless_search_shared::{CreateProjectRequest, ProjectDescriptor, SearchHit, SemanticQuery};

/// What happens to a created project when a later step fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Leave the project alive for inspection.
    #[default]
    RetainOnFailure,
    /// Delete the project on every exit path after creation.
    Always,
}

/// Progress of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    NotStarted,
    Created,
    Ready,
    Configured,
    Loaded,
    Queried,
    Deleted,
    Failed,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "not_started",
            Self::Created => "created",
            Self::Ready => "ready",
            Self::Configured => "configured",
            Self::Loaded => "loaded",
            Self::Queried => "queried",
            Self::Deleted => "deleted",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// The query issued once the dataset is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub field: String,
    pub text: String,
    pub size: usize,
}

impl Default for QueryPlan {
    fn default() -> Self {
        Self {
            field: "short_description.semantic".to_string(),
            text: "punk rock".to_string(),
            size: 1,
        }
    }
}

/// Everything a run creates, loads and asks.
#[derive(Debug, Clone)]
pub struct WorkflowPlan {
    pub project: CreateProjectRequest,
    pub inference: InferenceEndpoint,
    pub index_name: String,
    pub mapping: IndexMapping,
    pub data_path: PathBuf,
    pub query: QueryPlan,
}

impl WorkflowPlan {
    /// Plan for the news-headline dataset, using the inference endpoint for
    /// both semantic fields and the default query.
    pub fn news_articles(
        project: CreateProjectRequest,
        inference: InferenceEndpoint,
        index_name: impl Into<String>,
        data_path: impl Into<PathBuf>,
    ) -> Self {
        let mapping = IndexMapping::news_articles(&inference.inference_id);
        Self {
            project,
            inference,
            index_name: index_name.into(),
            mapping,
            data_path: data_path.into(),
            query: QueryPlan::default(),
        }
    }

    pub fn with_query(mut self, query: QueryPlan) -> Self {
        self.query = query;
        self
    }
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub readiness: ReadinessConfig,
    pub loader: LoaderConfig,
    pub cleanup: CleanupPolicy,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct WorkflowReport {
    pub project_id: String,
    pub final_state: WorkflowState,
    pub load: BulkIndexSummary,
    pub hits: Vec<SearchHit>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Orchestrator that runs the bootstrap workflow.
///
/// The orchestrator:
/// - Creates the project and waits for it to become ready
/// - Configures the inference endpoint and the index mapping
/// - Loads the dataset and runs the query
/// - Deletes the project, or applies the cleanup policy on failure
pub struct Orchestrator {
    control: Arc<dyn ControlPlaneClient>,
    search_factory: Arc<dyn SearchClientFactory>,
    plan: WorkflowPlan,
    config: OrchestratorConfig,
    state: WorkflowState,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Create a new orchestrator with default configuration.
    pub fn new(
        control: Arc<dyn ControlPlaneClient>,
        search_factory: Arc<dyn SearchClientFactory>,
        plan: WorkflowPlan,
    ) -> Self {
        Self::with_config(control, search_factory, plan, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        control: Arc<dyn ControlPlaneClient>,
        search_factory: Arc<dyn SearchClientFactory>,
        plan: WorkflowPlan,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            control,
            search_factory,
            plan,
            config,
            state: WorkflowState::NotStarted,
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Token that cancels the run when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Run the workflow to completion.
    ///
    /// # Returns
    ///
    /// * `Ok(WorkflowReport)` - Every step succeeded and the project is deleted
    /// * `Err(WorkflowError)` - The first failing step's error; the cleanup
    ///   policy decides whether the project was deleted
    #[instrument(skip(self), fields(project = %self.plan.project.name))]
    pub async fn run(&mut self) -> Result<WorkflowReport, WorkflowError> {
        let started_at = Utc::now();
        info!("Starting serverless search bootstrap");

        if let Err(e) = self.check_cancelled() {
            self.state = WorkflowState::Failed;
            return Err(e);
        }

        let project = match self.control.create_project(&self.plan.project).await {
            Ok(project) => project,
            Err(e) => {
                self.state = WorkflowState::Failed;
                error!(error = %e, "Failed to create project");
                return Err(e.into());
            }
        };
        self.state = WorkflowState::Created;
        info!(project_id = %project.id, endpoint = %project.endpoints.elasticsearch, "Project created");

        let (load, hits) = match self.run_steps(&project).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, state = %self.state, "Workflow step failed");
                self.state = WorkflowState::Failed;
                self.compensate(&project.id).await;
                return Err(e);
            }
        };

        if let Err(e) = self.control.delete_project(&project.id).await {
            self.state = WorkflowState::Failed;
            error!(project_id = %project.id, error = %e, "Failed to delete project");
            return Err(e.into());
        }
        self.state = WorkflowState::Deleted;
        info!(project_id = %project.id, "Project deleted");

        Ok(WorkflowReport {
            project_id: project.id,
            final_state: self.state,
            load,
            hits,
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn run_steps(
        &mut self,
        project: &ProjectDescriptor,
    ) -> Result<(BulkIndexSummary, Vec<SearchHit>), WorkflowError> {
        let poller = ReadinessPoller::with_config(self.control.clone(), self.config.readiness.clone());
        info!(project_id = %project.id, "Waiting for project to become ready");
        match poller.await_ready(&project.id, &self.cancel).await? {
            ReadinessOutcome::Ready { attempts, elapsed } => {
                info!(attempts, elapsed = ?elapsed, "Project ready");
            }
            ReadinessOutcome::TimedOut {
                attempts,
                elapsed,
                last_phase,
            } => {
                return Err(WorkflowError::ReadinessTimedOut {
                    project_id: project.id.clone(),
                    attempts,
                    elapsed,
                    last_phase,
                });
            }
            ReadinessOutcome::Cancelled { .. } => return Err(WorkflowError::Cancelled),
        }
        self.state = WorkflowState::Ready;
        self.check_cancelled()?;

        let client = self.search_factory.connect(project)?;
        client.create_inference_endpoint(&self.plan.inference).await?;
        info!(inference_id = %self.plan.inference.inference_id, "Inference endpoint created");
        client
            .create_index(&self.plan.index_name, &self.plan.mapping)
            .await?;
        info!(index = %self.plan.index_name, "Index created");
        self.state = WorkflowState::Configured;
        self.check_cancelled()?;

        let loader = BulkLoader::with_config(client.clone(), self.config.loader.clone());
        let load = loader
            .load_file(&self.plan.data_path, &self.plan.index_name)
            .await?;
        if load.failed > 0 {
            warn!(failed = load.failed, "Some documents were not indexed");
        }
        self.state = WorkflowState::Loaded;
        self.check_cancelled()?;

        let query = SemanticQuery::new(
            self.plan.index_name.clone(),
            self.plan.query.field.clone(),
            self.plan.query.text.clone(),
            self.plan.query.size,
        );
        let hits = client.semantic_search(&query).await?;
        info!(count = hits.len(), query = %query.text, "Query complete");
        self.state = WorkflowState::Queried;

        Ok((load, hits))
    }

    /// Delete the project after a failure when the policy asks for it.
    async fn compensate(&self, project_id: &str) {
        match self.config.cleanup {
            CleanupPolicy::RetainOnFailure => {
                warn!(project_id, "Leaving project in place after failure");
            }
            CleanupPolicy::Always => match self.control.delete_project(project_id).await {
                Ok(()) => info!(project_id, "Project deleted after failure"),
                Err(e) => error!(project_id, error = %e, "Cleanup delete failed"),
            },
        }
    }

    fn check_cancelled(&self) -> Result<(), WorkflowError> {
        if self.cancel.is_cancelled() {
            info!(state = %self.state, "Workflow cancelled");
            return Err(WorkflowError::Cancelled);
        }
        Ok(())
    }
}
