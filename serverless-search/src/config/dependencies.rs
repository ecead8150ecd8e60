//! Dependency initialization and wiring for the bootstrap run.

use std::sync::Arc;
use tracing::info;

use super::Config;
use crate::AppError;
use serverless_search_pipeline::Orchestrator;
use serverless_search_repository::{ServerlessControlClient, ServerlessSearchClientFactory};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from the loaded configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AppError)` - If the control API URL is invalid
    pub fn new(config: &Config) -> Result<Self, AppError> {
        info!(
            control_api_url = %config.control_api_url,
            project = %config.project.name,
            region = %config.project.region_id,
            index = %config.index_name,
            "Initializing dependencies"
        );

        let control = ServerlessControlClient::new(
            &config.control_api_url,
            config.control_api_key.clone(),
        )?;

        let orchestrator = Orchestrator::with_config(
            Arc::new(control),
            Arc::new(ServerlessSearchClientFactory),
            config.plan(),
            config.orchestrator_config(),
        );

        Ok(Self { orchestrator })
    }
}
