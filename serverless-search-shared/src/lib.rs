//! # Serverless Search Shared
//!
//! Plain data types shared by the control-plane client, the search client
//! and the workflow pipeline.

pub mod project;
pub mod search;

pub use project::{
    CreateProjectRequest, OptimizationProfile, ProjectCredentials, ProjectDescriptor,
    ProjectEndpoints, ProjectPhase, ProjectStatus,
};
pub use search::{SearchHit, SemanticQuery};
