//! Agent tools for running code in AgentBay cloud sandboxes.
//!
//! This crate adapts the AgentBay session lifecycle (create, run, delete) to
//! the tool-calling interface used by agent runtimes. It is organized in layers:
//!
//! - **Provider client**: HTTP access to the sandbox service behind the
//!   [`SandboxProvider`] and [`RetrievalProvider`] traits
//! - **Executor**: one session per request, torn down on every exit path
//! - **Task runtime**: closed set of named actions for the JSON-envelope tool
//! - **Tools**: schema-validated adapters with lazily built, shared backends
//! - **Configuration**: YAML, env files and environment-variable resolution

pub mod config;
pub mod core_types;
pub mod errors;
pub mod executors;
pub mod provider;
pub mod runtime;
pub mod tools;

pub use config::*;
pub use core_types::{ExecutionRequest, Labels, Language, RunCodeInput};
pub use errors::AgentBayError;
pub use executors::{AgentBayCodeExecutor, CodeExecutor};
pub use provider::{AgentBayClient, RetrievalProvider, SandboxProvider, Session};
pub use runtime::{AgentBayRuntime, RuntimeResponse};
pub use tools::{Tool, ToolFactory, ToolMetadata, ToolRegistry};

#[cfg(test)]
pub mod test_utils;
