//! # Serverless Search
//!
//! Main library for the serverless semantic-search bootstrap.
//!
//! This crate provides the configuration, dependency wiring and logging
//! setup for running the bootstrap workflow once.

pub mod config;
pub mod telemetry;

pub use config::{Config, ConfigError, Dependencies, LogFormat};

use serverless_search_pipeline::WorkflowError;
use thiserror::Error;

/// Errors that can end the process.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Workflow error.
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),
}

impl From<serverless_search_repository::ProvisioningError> for AppError {
    fn from(e: serverless_search_repository::ProvisioningError) -> Self {
        Self::Workflow(e.into())
    }
}
