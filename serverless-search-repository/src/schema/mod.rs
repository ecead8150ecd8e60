//! Static descriptors for the search infrastructure created on a project.

mod inference;
mod mapping;

pub use inference::{AzureOpenAiSettings, InferenceEndpoint};
pub use mapping::{FieldMapping, IndexMapping};
