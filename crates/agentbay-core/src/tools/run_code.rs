//! `agentbay_run_code`: run a Python or JavaScript snippet in a cloud sandbox
//!
//! Arguments are checked against the published schema and normalized before
//! the executor is even constructed, so a malformed call never reaches the
//! provider.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::lazy::LazyBackend;
use super::schema::ArgumentValidator;
use super::{Tool, ToolMetadata};
use crate::config::AgentBayConfig;
use crate::core_types::{RunCodeInput, DEFAULT_TIMEOUT_SECS, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS};
use crate::errors::AgentBayError;
use crate::executors::{AgentBayCodeExecutor, CodeExecutor};

pub const RUN_CODE_TOOL_NAME: &str = "agentbay_run_code";

pub struct RunCodeTool {
    executor: LazyBackend<dyn CodeExecutor>,
    validator: Result<ArgumentValidator, AgentBayError>,
}

fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "code": {
                "type": "string",
                "description": "Code content to execute"
            },
            "language": {
                "type": "string",
                "description": "Programming language, either python or javascript",
                "default": "python"
            },
            "timeout_s": {
                "type": "integer",
                "description": "Timeout in seconds, max 60s",
                "minimum": MIN_TIMEOUT_SECS,
                "maximum": MAX_TIMEOUT_SECS,
                "default": DEFAULT_TIMEOUT_SECS
            },
            "labels": {
                "type": ["object", "null"],
                "description": "Optional: session labels",
                "additionalProperties": {"type": "string"}
            }
        },
        "required": ["code"]
    })
}

impl RunCodeTool {
    /// Executor built from the process environment on first call.
    pub fn from_env() -> Self {
        Self::with_backend(LazyBackend::new(|| {
            let executor = AgentBayCodeExecutor::new(None)?;
            Ok(Arc::new(executor) as Arc<dyn CodeExecutor>)
        }))
    }

    pub fn from_config(config: AgentBayConfig) -> Self {
        Self::with_backend(LazyBackend::new(move || {
            let executor = AgentBayCodeExecutor::from_config(&config, None)?;
            Ok(Arc::new(executor) as Arc<dyn CodeExecutor>)
        }))
    }

    pub fn with_executor(executor: Arc<dyn CodeExecutor>) -> Self {
        Self::with_backend(LazyBackend::ready(executor))
    }

    pub fn with_backend(executor: LazyBackend<dyn CodeExecutor>) -> Self {
        Self {
            executor,
            validator: ArgumentValidator::compile(RUN_CODE_TOOL_NAME, &input_schema()),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.executor.is_initialized()
    }
}

#[async_trait]
impl Tool for RunCodeTool {
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata {
            name: RUN_CODE_TOOL_NAME.to_string(),
            description: "Execute code (python/javascript) in an AgentBay cloud session and return the stdout text.".to_string(),
            input_schema: input_schema(),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String, AgentBayError> {
        self.validator.as_ref().map_err(Clone::clone)?.validate(&arguments)?;
        let request = RunCodeInput::from_value(arguments)?.into_request()?;

        log::info!(
            "{}: running {} code (timeout: {}s)",
            RUN_CODE_TOOL_NAME,
            request.language,
            request.timeout_secs
        );

        let executor = self.executor.get().await?;
        executor.execute(&request).await
    }
}
