//! Error types for the AgentBay execution stack
//!
//! Every fallible operation in this crate returns [`AgentBayError`]. Variants are
//! split by the stage that failed (configuration, input validation, session
//! provisioning, execution) so callers can tell a bad request apart from a
//! provider outage without parsing messages.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentBayError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Failed to create session: {0}")]
    SessionCreationError(String),
    #[error("Code execution failed: {0}")]
    ExecutionError(String),
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Provider error: {0}")]
    ProviderError(String),
    #[error("Tool execution failed for '{tool_name}': {message}")]
    ToolError { tool_name: String, message: String },
    #[error("Internal error: {0}")]
    InternalError(String),
    #[error("I/O error: {0}")]
    IoError(String),
}

impl AgentBayError {
    /// True for failures raised before any remote call was attempted.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AgentBayError::ConfigError(_)
                | AgentBayError::ValidationError(_)
                | AgentBayError::UnknownAction(_)
        )
    }
}

impl From<std::io::Error> for AgentBayError {
    fn from(err: std::io::Error) -> Self {
        AgentBayError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AgentBayError {
    fn from(err: serde_json::Error) -> Self {
        AgentBayError::ValidationError(format!("Invalid JSON: {}", err))
    }
}
