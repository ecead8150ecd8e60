//! Control plane client trait definition.

use async_trait::async_trait;

use crate::errors::ProvisioningError;
use serverless_search_shared::{CreateProjectRequest, ProjectDescriptor, ProjectStatus};

/// Abstract interface for the project lifecycle API.
///
/// Implementations perform exactly one request per call and never retry; a
/// failed call is a hard failure for the caller.
#[async_trait]
pub trait ControlPlaneClient: Send + Sync {
    /// Create a new project.
    ///
    /// Allocates a billable remote resource.
    ///
    /// # Returns
    ///
    /// * `Ok(ProjectDescriptor)` - Only when the API answered `201 Created`
    /// * `Err(ProvisioningError)` - Any other status, carrying the provider payload
    async fn create_project(
        &self,
        request: &CreateProjectRequest,
    ) -> Result<ProjectDescriptor, ProvisioningError>;

    /// Fetch the current lifecycle phase of a project.
    async fn project_status(&self, project_id: &str) -> Result<ProjectStatus, ProvisioningError>;

    /// Delete a project and everything stored in it. Irreversible.
    async fn delete_project(&self, project_id: &str) -> Result<(), ProvisioningError>;
}
