//! Provisioning error types.
//!
//! Errors raised by the project control API client.

use thiserror::Error;

/// Errors that can occur while creating, inspecting or deleting a project.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningError {
    /// The control API answered with a status other than the expected one.
    #[error("{operation} failed with status {status}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The configured base URL is not usable.
    #[error("Invalid control API URL: {0}")]
    InvalidUrl(String),
}

impl ProvisioningError {
    /// Create an unexpected status error.
    pub fn unexpected_status(operation: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            operation,
            status,
            body: body.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
