//! Action-routed runtime behind the `Run AgentBay task` tool.
//!
//! A task payload names an action plus its inputs and config. Actions form a
//! closed set; anything else is rejected with [`AgentBayError::UnknownAction`]
//! before any remote call.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::config::{AgentBayConfig, ConfigLoader};
use crate::core_types::{ExecutionRequest, RunCodeInput};
use crate::errors::AgentBayError;
use crate::executors::{AgentBayCodeExecutor, CodeExecutor};
use crate::provider::{AgentBayClient, RetrievalProvider};

pub const DEFAULT_TOP_K: u32 = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskPayload {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub inputs: Value,
    #[serde(default)]
    pub config: Value,
}

impl TaskPayload {
    /// Accepts a JSON object or a string holding one.
    pub fn parse(payload: Value) -> Result<Self, AgentBayError> {
        let payload = match payload {
            Value::String(text) => serde_json::from_str::<Value>(&text).map_err(|e| {
                AgentBayError::ValidationError(format!(
                    "task payload must be a JSON string or object: {}",
                    e
                ))
            })?,
            other => other,
        };

        if !payload.is_object() {
            return Err(AgentBayError::ValidationError(
                "task payload must be a JSON object with an 'action' field".to_string(),
            ));
        }

        serde_json::from_value(payload)
            .map_err(|e| AgentBayError::ValidationError(format!("Invalid task payload: {}", e)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RetrieveSummarize { query: String, top_k: u32 },
    RunCode(ExecutionRequest),
}

impl Action {
    pub const SUPPORTED: [&'static str; 2] = ["retrieve_summarize", "run_code"];

    pub fn name(&self) -> &'static str {
        match self {
            Action::RetrieveSummarize { .. } => "retrieve_summarize",
            Action::RunCode(_) => "run_code",
        }
    }

    pub fn from_payload(payload: &TaskPayload) -> Result<Self, AgentBayError> {
        match payload.action.trim() {
            "retrieve_summarize" => {
                let query = payload
                    .inputs
                    .get("query")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|q| !q.is_empty())
                    .ok_or_else(|| {
                        AgentBayError::ValidationError(
                            "retrieve_summarize requires a non-empty inputs.query".to_string(),
                        )
                    })?;
                let top_k = parse_top_k(payload.config.get("top_k"))?;
                Ok(Action::RetrieveSummarize {
                    query: query.to_string(),
                    top_k,
                })
            }
            "run_code" => {
                let request = RunCodeInput::from_value(payload.inputs.clone())?.into_request()?;
                Ok(Action::RunCode(request))
            }
            other => Err(AgentBayError::UnknownAction(format!(
                "'{}' (supported: {})",
                other,
                Self::SUPPORTED.join(", ")
            ))),
        }
    }
}

fn parse_top_k(value: Option<&Value>) -> Result<u32, AgentBayError> {
    let top_k = match value {
        None | Some(Value::Null) => return Ok(DEFAULT_TOP_K),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };

    match top_k {
        Some(k) if (1..=u64::from(u32::MAX)).contains(&k) => Ok(k as u32),
        _ => Err(AgentBayError::ValidationError(
            "config.top_k must be a positive integer".to_string(),
        )),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuntimeResponse {
    pub ok: bool,
    pub data: Value,
}

impl RuntimeResponse {
    pub fn success(data: Value) -> Self {
        Self { ok: true, data }
    }
}

pub struct AgentBayRuntime {
    executor: Arc<dyn CodeExecutor>,
    retrieval: Arc<dyn RetrievalProvider>,
}

impl AgentBayRuntime {
    pub fn new(executor: Arc<dyn CodeExecutor>, retrieval: Arc<dyn RetrievalProvider>) -> Self {
        Self {
            executor,
            retrieval,
        }
    }

    pub fn from_env() -> Result<Self, AgentBayError> {
        let config = ConfigLoader::from_env()?;
        Self::from_config(&config, None)
    }

    /// One HTTP client serves both code sessions and retrieval.
    pub fn from_config(
        config: &AgentBayConfig,
        api_key: Option<String>,
    ) -> Result<Self, AgentBayError> {
        let credentials = config.resolve_credentials(api_key)?;
        let client = Arc::new(AgentBayClient::new(config, credentials)?);
        let executor =
            AgentBayCodeExecutor::with_provider(client.clone(), Some(config.image_id.clone()));
        Ok(Self::new(Arc::new(executor), client))
    }

    pub async fn run(&self, payload: Value) -> Result<RuntimeResponse, AgentBayError> {
        let payload = TaskPayload::parse(payload)?;
        let action = Action::from_payload(&payload)?;
        log::info!("AgentBay runtime dispatching action '{}'", action.name());

        match action {
            Action::RetrieveSummarize { query, top_k } => {
                let data = self.retrieval.retrieve_and_summarize(&query, top_k).await?;
                Ok(RuntimeResponse::success(data))
            }
            Action::RunCode(request) => {
                let output = self.executor.execute(&request).await?;
                Ok(RuntimeResponse::success(Value::String(output)))
            }
        }
    }
}
