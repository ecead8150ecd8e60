//! Serverless project control API client.
//!
//! This module provides the concrete implementation of `ControlPlaneClient`
//! over the project REST API using `reqwest`.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::errors::ProvisioningError;
use crate::interfaces::ControlPlaneClient;
use serverless_search_shared::{CreateProjectRequest, ProjectDescriptor, ProjectStatus};

/// Control API client for serverless search projects.
///
/// # Example
///
/// ```ignore
/// let client = ServerlessControlClient::new(
///     "https://api.example.io/api/v1/serverless/projects/elasticsearch",
///     api_key,
/// )?;
/// let project = client.create_project(&CreateProjectRequest::new("demo")).await?;
/// ```
pub struct ServerlessControlClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ServerlessControlClient {
    /// Create a new client for the projects collection at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - URL of the projects collection; trailing slashes are ignored
    /// * `api_key` - Key sent as `Authorization: ApiKey <key>`
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ProvisioningError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ProvisioningError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ProvisioningError::transport(e.to_string()))?;

        let base_url = parsed.as_str().trim_end_matches('/').to_string();
        info!(base_url = %base_url, "Created control API client");

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    fn project_url(&self, project_id: &str) -> String {
        format!("{}/{}", self.base_url, project_id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("ApiKey {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
    }

    /// Fail unless the response carries `expected`, keeping the provider payload.
    async fn expect_status(
        response: Response,
        expected: StatusCode,
        operation: &'static str,
    ) -> Result<Response, ProvisioningError> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!(operation, status = %status, body = %body, "Control API request failed");
        Err(ProvisioningError::unexpected_status(
            operation,
            status.as_u16(),
            body,
        ))
    }
}

#[async_trait]
impl ControlPlaneClient for ServerlessControlClient {
    #[instrument(skip(self, request), fields(name = %request.name, region = %request.region_id))]
    async fn create_project(
        &self,
        request: &CreateProjectRequest,
    ) -> Result<ProjectDescriptor, ProvisioningError> {
        let response = self
            .request(Method::POST, &self.base_url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProvisioningError::transport(e.to_string()))?;

        let response = Self::expect_status(response, StatusCode::CREATED, "create project").await?;

        let project: ProjectDescriptor = response
            .json()
            .await
            .map_err(|e| ProvisioningError::parse(e.to_string()))?;

        info!(project_id = %project.id, endpoint = %project.endpoints.elasticsearch, "Project created");
        Ok(project)
    }

    #[instrument(skip(self))]
    async fn project_status(&self, project_id: &str) -> Result<ProjectStatus, ProvisioningError> {
        let url = format!("{}/status", self.project_url(project_id));
        let response = self
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(|e| ProvisioningError::transport(e.to_string()))?;

        let response = Self::expect_status(response, StatusCode::OK, "get project status").await?;

        let status: ProjectStatus = response
            .json()
            .await
            .map_err(|e| ProvisioningError::parse(e.to_string()))?;

        debug!(phase = %status.phase, "Fetched project status");
        Ok(status)
    }

    #[instrument(skip(self))]
    async fn delete_project(&self, project_id: &str) -> Result<(), ProvisioningError> {
        let response = self
            .request(Method::DELETE, &self.project_url(project_id))
            .send()
            .await
            .map_err(|e| ProvisioningError::transport(e.to_string()))?;

        Self::expect_status(response, StatusCode::OK, "delete project").await?;

        info!("Project deleted");
        Ok(())
    }
}
