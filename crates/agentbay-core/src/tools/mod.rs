//! Tool system exposing AgentBay execution to agent runtimes
//!
//! Each tool publishes a name, a natural-language description and a JSON Schema
//! for its arguments, which an LLM planner uses to decide when and how to call
//! it. Tools are registered by name and invoked with a JSON argument object;
//! they always answer with plain text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::AgentBayConfig;
use crate::errors::AgentBayError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

// Core Tool trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    fn metadata(&self) -> ToolMetadata;
    async fn execute(&self, arguments: Value) -> Result<String, AgentBayError>;
}

// Tool registry for managing multiple tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register_tool(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.metadata().name.clone();
        self.tools.insert(name, tool);
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Metadata of every registered tool, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolMetadata> {
        let mut tools: Vec<ToolMetadata> = self.tools.values().map(|tool| tool.metadata()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn remove_tool(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name)
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Look up `name` and run it.
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<String, AgentBayError> {
        let tool = self.get_tool(name).ok_or_else(|| AgentBayError::ToolError {
            tool_name: name.to_string(),
            message: "no tool registered under this name".to_string(),
        })?;
        tool.execute(arguments).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Tool factory for creating the AgentBay tools
pub struct ToolFactory;

impl ToolFactory {
    /// `agentbay_run_code`, configured from the environment on first use.
    pub fn create_run_code_tool() -> Arc<dyn Tool> {
        Arc::new(run_code::RunCodeTool::from_env())
    }

    pub fn create_run_code_tool_with_config(config: AgentBayConfig) -> Arc<dyn Tool> {
        Arc::new(run_code::RunCodeTool::from_config(config))
    }

    /// `Run AgentBay task`, configured from the environment on first use.
    pub fn create_task_tool() -> Arc<dyn Tool> {
        Arc::new(agentbay_task::AgentBayTaskTool::from_env())
    }

    pub fn create_task_tool_with_config(config: AgentBayConfig) -> Arc<dyn Tool> {
        Arc::new(agentbay_task::AgentBayTaskTool::from_config(config))
    }

    pub fn create_default_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_tool(Self::create_run_code_tool());
        registry.register_tool(Self::create_task_tool());
        registry
    }

    pub fn create_registry_with_config(config: AgentBayConfig) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_tool(Self::create_run_code_tool_with_config(config.clone()));
        registry.register_tool(Self::create_task_tool_with_config(config));
        registry
    }
}

pub mod agentbay_task;
pub mod lazy;
pub mod run_code;
pub mod schema;

// Re-export commonly used items
pub use agentbay_task::AgentBayTaskTool;
pub use lazy::LazyBackend;
pub use run_code::RunCodeTool;
