//! `Run AgentBay task`: JSON-in, JSON-out access to the action runtime
//!
//! The agent passes a JSON document naming an action (for example
//! `retrieve_summarize`) with its inputs and config. The answer is always a
//! JSON string, `{"ok": true, "data": ...}`, so the planner can parse results
//! from every action the same way.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::lazy::LazyBackend;
use super::{Tool, ToolMetadata};
use crate::config::AgentBayConfig;
use crate::errors::AgentBayError;
use crate::runtime::AgentBayRuntime;

pub const TASK_TOOL_NAME: &str = "Run AgentBay task";

pub struct AgentBayTaskTool {
    runtime: LazyBackend<AgentBayRuntime>,
}

impl AgentBayTaskTool {
    pub fn from_env() -> Self {
        Self {
            runtime: LazyBackend::new(|| Ok(Arc::new(AgentBayRuntime::from_env()?))),
        }
    }

    pub fn from_config(config: AgentBayConfig) -> Self {
        Self {
            runtime: LazyBackend::new(move || {
                Ok(Arc::new(AgentBayRuntime::from_config(&config, None)?))
            }),
        }
    }

    pub fn with_runtime(runtime: Arc<AgentBayRuntime>) -> Self {
        Self {
            runtime: LazyBackend::ready(runtime),
        }
    }

    /// `{"input_text": "<json>"}` as declared, or the payload object itself.
    fn extract_payload(arguments: Value) -> Result<Value, AgentBayError> {
        match arguments {
            Value::Object(mut map) if map.contains_key("input_text") => {
                match map.remove("input_text") {
                    Some(text @ Value::String(_)) => Ok(text),
                    Some(Value::Object(payload)) => Ok(Value::Object(payload)),
                    _ => Err(AgentBayError::ValidationError(
                        "input_text must be a JSON string".to_string(),
                    )),
                }
            }
            other @ (Value::Object(_) | Value::String(_)) => Ok(other),
            _ => Err(AgentBayError::ValidationError(
                "expected {\"input_text\": \"<json payload>\"}".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Tool for AgentBayTaskTool {
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata {
            name: TASK_TOOL_NAME.to_string(),
            description: "Call the AgentBay runtime. input_text must be a JSON string with fields: \
                action (e.g. \"retrieve_summarize\" or \"run_code\"), \
                inputs (e.g. {\"query\": \"product keyword\"}), \
                config (e.g. {\"top_k\": 3}). Returns the result as a JSON string."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "input_text": {
                        "type": "string",
                        "description": "JSON payload with action, inputs and config"
                    }
                },
                "required": ["input_text"]
            }),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String, AgentBayError> {
        let payload = Self::extract_payload(arguments)?;
        let runtime = self.runtime.get().await?;
        let response = runtime.run(payload).await?;
        serde_json::to_string(&response).map_err(|e| {
            AgentBayError::InternalError(format!("Failed to encode task result: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executors::AgentBayCodeExecutor;
    use crate::provider::RetrievalProvider;
    use crate::test_utils::{FakeSandboxProvider, RunBehavior};

    struct StaticRetrieval;

    #[async_trait]
    impl RetrievalProvider for StaticRetrieval {
        async fn retrieve_and_summarize(
            &self,
            query: &str,
            _top_k: u32,
        ) -> Result<Value, AgentBayError> {
            Ok(json!({"要点": format!("关于{}的洞察", query)}))
        }
    }

    fn tool(provider: Arc<FakeSandboxProvider>) -> AgentBayTaskTool {
        let executor = Arc::new(AgentBayCodeExecutor::with_provider(provider, None));
        AgentBayTaskTool::with_runtime(Arc::new(AgentBayRuntime::new(
            executor,
            Arc::new(StaticRetrieval),
        )))
    }

    #[tokio::test]
    async fn test_metadata() {
        let tool = AgentBayTaskTool::from_env();
        let metadata = tool.metadata();
        assert_eq!(metadata.name, "Run AgentBay task");
        assert!(metadata.description.contains("retrieve_summarize"));
    }

    #[tokio::test]
    async fn test_run_code_envelope() {
        let tool = tool(Arc::new(FakeSandboxProvider::echo()));
        let output = tool
            .execute(json!({
                "input_text": r#"{"action": "run_code", "inputs": {"code": "print('hi')", "language": "python", "timeout_s": 60}}"#
            }))
            .await
            .unwrap();

        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!({"ok": true, "data": "hi"}));
    }

    #[tokio::test]
    async fn test_non_ascii_is_preserved() {
        let tool = tool(Arc::new(FakeSandboxProvider::echo()));
        let output = tool
            .execute(json!({
                "action": "retrieve_summarize",
                "inputs": {"query": "企业级知识库"}
            }))
            .await
            .unwrap();
        assert!(output.contains("企业级知识库"));
        assert!(!output.contains("\\u"));
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let provider = Arc::new(FakeSandboxProvider::new(RunBehavior::Fault("boom".into())));
        let tool = tool(provider.clone());

        let err = tool
            .execute(json!({"input_text": r#"{"action": "run_code", "inputs": {"code": "print(1)"}}"#}))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentBayError::ExecutionError(_)));
        assert_eq!(provider.delete_calls(), 1);

        let err = tool
            .execute(json!({"input_text": r#"{"action": "translate"}"#}))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentBayError::UnknownAction(_)));

        let err = tool.execute(json!({"input_text": 12})).await.unwrap_err();
        assert!(matches!(err, AgentBayError::ValidationError(_)));

        let err = tool.execute(json!([1])).await.unwrap_err();
        assert!(matches!(err, AgentBayError::ValidationError(_)));
    }
}
