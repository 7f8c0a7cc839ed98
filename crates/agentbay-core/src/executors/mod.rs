//! Code execution backends.
//!
//! Adapters depend on the [`CodeExecutor`] trait only; the AgentBay executor
//! is the production implementation that runs each request in its own remote
//! session.

use async_trait::async_trait;

use crate::core_types::ExecutionRequest;
use crate::errors::AgentBayError;

#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Run one request and return its captured stdout.
    async fn execute(&self, request: &ExecutionRequest) -> Result<String, AgentBayError>;
}

pub mod agentbay;

pub use agentbay::AgentBayCodeExecutor;
