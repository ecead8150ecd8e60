//! Project lifecycle types.
//!
//! These mirror the JSON bodies exchanged with the project control API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default region for new projects.
pub const DEFAULT_REGION: &str = "aws-us-east-1";

/// Hardware profile a search project is optimized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationProfile {
    /// Dense-vector workloads.
    #[default]
    Vector,
    /// General purpose full-text workloads.
    GeneralPurpose,
}

impl OptimizationProfile {
    /// The wire value of this profile.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::GeneralPurpose => "general_purpose",
        }
    }
}

impl std::str::FromStr for OptimizationProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vector" => Ok(Self::Vector),
            "general_purpose" => Ok(Self::GeneralPurpose),
            other => Err(format!("unknown optimization profile '{}'", other)),
        }
    }
}

/// Body of a create-project request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateProjectRequest {
    /// Human readable project name.
    pub name: String,
    /// Cloud region identifier (e.g. `aws-us-east-1`).
    pub region_id: String,
    /// Optimization profile.
    pub optimized_for: OptimizationProfile,
}

impl CreateProjectRequest {
    /// Create a request for the default region and the vector profile.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region_id: DEFAULT_REGION.to_string(),
            optimized_for: OptimizationProfile::Vector,
        }
    }

    /// Set the region.
    pub fn with_region(mut self, region_id: impl Into<String>) -> Self {
        self.region_id = region_id.into();
        self
    }

    /// Set the optimization profile.
    pub fn with_profile(mut self, profile: OptimizationProfile) -> Self {
        self.optimized_for = profile;
        self
    }
}

/// Connection endpoints of a provisioned project.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectEndpoints {
    /// URL of the search API.
    pub elasticsearch: String,
    /// URL of the UI, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kibana: Option<String>,
}

/// Credentials issued at project creation.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ProjectCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A provisioned project as returned by the create call.
///
/// The orchestrator owns this value for the duration of a run and is the only
/// component allowed to delete the remote project it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    /// Provider assigned project id.
    pub id: String,
    /// Project name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Region the project lives in.
    pub region_id: String,
    /// Project type (e.g. `elasticsearch`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default)]
    pub optimized_for: OptimizationProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_id: Option<String>,
    pub endpoints: ProjectEndpoints,
    pub credentials: ProjectCredentials,
}

/// Lifecycle phase reported by the status endpoint.
///
/// Only `initializing` and `initialized` are given names; any other value the
/// provider reports is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProjectPhase {
    Initializing,
    Initialized,
    Other(String),
}

impl ProjectPhase {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Initializing => "initializing",
            Self::Initialized => "initialized",
            Self::Other(phase) => phase,
        }
    }
}

impl From<String> for ProjectPhase {
    fn from(value: String) -> Self {
        match value.as_str() {
            "initializing" => Self::Initializing,
            "initialized" => Self::Initialized,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for ProjectPhase {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ProjectPhase> for String {
    fn from(phase: ProjectPhase) -> Self {
        phase.as_str().to_string()
    }
}

impl fmt::Display for ProjectPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a project status response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStatus {
    pub phase: ProjectPhase,
}

impl ProjectStatus {
    pub fn new(phase: impl Into<ProjectPhase>) -> Self {
        Self {
            phase: phase.into(),
        }
    }
}
