//! Inference endpoint descriptors.

use std::fmt;

use serde::Serialize;
use serde_json::{json, Value};

/// Task type used for semantic fields.
pub const TEXT_EMBEDDING_TASK: &str = "text_embedding";

/// Deployment parameters of an Azure OpenAI embedding model.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct AzureOpenAiSettings {
    pub api_key: String,
    pub resource_name: String,
    pub deployment_id: String,
    pub api_version: String,
}

impl fmt::Debug for AzureOpenAiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOpenAiSettings")
            .field("api_key", &"<redacted>")
            .field("resource_name", &self.resource_name)
            .field("deployment_id", &self.deployment_id)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// A named embedding model configuration.
///
/// Must exist before an index mapping references `inference_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceEndpoint {
    pub task_type: String,
    pub inference_id: String,
    pub service: String,
    pub settings: AzureOpenAiSettings,
}

impl InferenceEndpoint {
    /// A text-embedding endpoint served by Azure OpenAI.
    pub fn azure_openai(inference_id: impl Into<String>, settings: AzureOpenAiSettings) -> Self {
        Self {
            task_type: TEXT_EMBEDDING_TASK.to_string(),
            inference_id: inference_id.into(),
            service: "azureopenai".to_string(),
            settings,
        }
    }

    /// Request path for creating this endpoint.
    pub fn path(&self) -> String {
        format!("/_inference/{}/{}", self.task_type, self.inference_id)
    }

    /// Body of the endpoint creation request.
    pub fn to_body(&self) -> Value {
        json!({
            "service": self.service,
            "service_settings": self.settings,
        })
    }
}
