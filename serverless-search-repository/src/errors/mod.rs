//! Error types for the serverless search repository.

mod provisioning_error;
mod search_error;

pub use provisioning_error::ProvisioningError;
pub use search_error::SearchError;
