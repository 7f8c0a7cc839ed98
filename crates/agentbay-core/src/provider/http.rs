// src/provider/http.rs
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;

use super::{
    CreateSessionParams, RetrievalProvider, RunCodeOutcome, RunCodeRequest, SandboxProvider,
    Session,
};
use crate::config::{AgentBayConfig, Credentials};
use crate::errors::AgentBayError;

/// HTTPS client for the AgentBay sandbox API.
pub struct AgentBayClient {
    client: Client,
    api_base: String,
    credentials: Credentials,
    execution_grace: Duration,
}

#[derive(Debug, Deserialize)]
struct CreateSessionResponse {
    success: bool,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    success: bool,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RetrievalResponse {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error_message: Option<String>,
}

enum CallError {
    Timeout,
    Transport(String),
    Status(StatusCode, String),
    Decode(String),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Timeout => write!(f, "request timed out"),
            CallError::Transport(message) => write!(f, "request failed: {}", message),
            CallError::Status(status, body) => write!(f, "HTTP {}: {}", status, body),
            CallError::Decode(message) => write!(f, "invalid response: {}", message),
        }
    }
}

impl AgentBayClient {
    pub fn new(config: &AgentBayConfig, credentials: Credentials) -> Result<Self, AgentBayError> {
        config.validate()?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("agentbay-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AgentBayError::ConfigError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credentials,
            execution_grace: Duration::from_secs(config.execution_grace_secs),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn session_url(&self, session: &Session, suffix: &str) -> String {
        self.url(&format!(
            "/v1/sessions/{}{}",
            urlencoding::encode(session.session_id()),
            suffix
        ))
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CallError> {
        let response = request
            .bearer_auth(self.credentials.expose())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CallError::Timeout
                } else {
                    CallError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v["error_message"].as_str().map(str::to_string))
                .unwrap_or(body);
            return Err(CallError::Status(status, message));
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                CallError::Timeout
            } else {
                CallError::Decode(e.to_string())
            }
        })
    }
}

#[async_trait]
impl SandboxProvider for AgentBayClient {
    async fn create_session(
        &self,
        params: &CreateSessionParams,
    ) -> Result<Session, AgentBayError> {
        log::debug!(
            "Creating AgentBay session at {} (image: {:?})",
            self.api_base,
            params.image_id
        );

        let response: CreateSessionResponse = self
            .call(self.client.post(self.url("/v1/sessions")).json(params))
            .await
            .map_err(|e| AgentBayError::SessionCreationError(e.to_string()))?;

        if !response.success {
            return Err(AgentBayError::SessionCreationError(
                response
                    .error_message
                    .unwrap_or_else(|| "provider reported failure".to_string()),
            ));
        }

        let session_id = response.session_id.filter(|id| !id.is_empty()).ok_or_else(|| {
            AgentBayError::SessionCreationError(
                "provider response did not include a session_id".to_string(),
            )
        })?;

        Ok(Session::new(session_id).with_request_id(response.request_id))
    }

    async fn run_code(
        &self,
        session: &Session,
        request: &RunCodeRequest,
    ) -> Result<RunCodeOutcome, AgentBayError> {
        let transport_timeout =
            Duration::from_secs(u64::from(request.timeout_s)) + self.execution_grace;

        let http_request = self
            .client
            .post(self.session_url(session, "/code"))
            .timeout(transport_timeout)
            .json(request);

        self.call::<RunCodeOutcome>(http_request)
            .await
            .map_err(|e| match e {
                CallError::Timeout => AgentBayError::ExecutionError(format!(
                    "execution timed out after {}s in session {}",
                    request.timeout_s,
                    session.session_id()
                )),
                other => AgentBayError::ExecutionError(other.to_string()),
            })
    }

    async fn delete_session(&self, session: Session) -> Result<(), AgentBayError> {
        let response: StatusResponse = self
            .call(self.client.delete(self.session_url(&session, "")))
            .await
            .map_err(|e| {
                AgentBayError::ProviderError(format!(
                    "Failed to delete session {}: {}",
                    session.session_id(),
                    e
                ))
            })?;

        if !response.success {
            return Err(AgentBayError::ProviderError(format!(
                "Failed to delete session {}: {}",
                session.session_id(),
                response.error_message.unwrap_or_default()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl RetrievalProvider for AgentBayClient {
    async fn retrieve_and_summarize(
        &self,
        query: &str,
        top_k: u32,
    ) -> Result<Value, AgentBayError> {
        let payload = json!({
            "query": query,
            "top_k": top_k,
        });

        let response: RetrievalResponse = self
            .call(
                self.client
                    .post(self.url("/v1/knowledge/retrieve_summarize"))
                    .json(&payload),
            )
            .await
            .map_err(|e| AgentBayError::ProviderError(format!("retrieve_summarize {}", e)))?;

        if !response.success {
            return Err(AgentBayError::ProviderError(
                response
                    .error_message
                    .unwrap_or_else(|| "retrieve_summarize failed".to_string()),
            ));
        }

        Ok(response.data.unwrap_or(Value::Null))
    }
}
