// src/executors/agentbay.rs
use async_trait::async_trait;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use super::CodeExecutor;
use crate::config::{AgentBayConfig, ConfigLoader};
use crate::core_types::{ExecutionRequest, Labels, Language};
use crate::errors::AgentBayError;
use crate::provider::{AgentBayClient, CreateSessionParams, RunCodeRequest, SandboxProvider, Session};

async fn release_session(provider: Arc<dyn SandboxProvider>, session: Session) {
    let session_id = session.session_id().to_string();
    match provider.delete_session(session).await {
        Ok(()) => log::info!("Deleted AgentBay session {}", session_id),
        Err(e) => log::warn!("Failed to delete AgentBay session {}: {}", session_id, e),
    }
}

/// Deletes a live session in the background if dropped while still armed.
///
/// Covers callers that drop the `execute` future mid-run (timeouts, `select!`,
/// aborted tasks).
struct SessionGuard {
    provider: Arc<dyn SandboxProvider>,
    session_id: Option<String>,
}

impl SessionGuard {
    fn arm(provider: Arc<dyn SandboxProvider>, session: &Session) -> Self {
        Self {
            provider,
            session_id: Some(session.session_id().to_string()),
        }
    }

    fn disarm(mut self) {
        self.session_id = None;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session_id) = self.session_id.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                log::warn!(
                    "Execution in AgentBay session {} was cancelled, deleting in background",
                    session_id
                );
                handle.spawn(release_session(
                    self.provider.clone(),
                    Session::new(session_id),
                ));
            }
            Err(_) => log::warn!(
                "No async runtime available to delete cancelled AgentBay session {}",
                session_id
            ),
        }
    }
}

/// Runs code in a fresh AgentBay session per request.
///
/// Sequence per call: create session, run code, delete session. Deletion is
/// attempted on every path once a session exists, including provider faults
/// and panics; its own failure is logged and never replaces the execution
/// outcome.
pub struct AgentBayCodeExecutor {
    provider: Arc<dyn SandboxProvider>,
    image_id: Option<String>,
}

impl AgentBayCodeExecutor {
    /// Build an executor from the process environment. `api_key` takes
    /// precedence over `AGENTBAY_API_KEY`.
    pub fn new(api_key: Option<String>) -> Result<Self, AgentBayError> {
        let config = ConfigLoader::from_env()?;
        Self::from_config(&config, api_key)
    }

    pub fn from_config(
        config: &AgentBayConfig,
        api_key: Option<String>,
    ) -> Result<Self, AgentBayError> {
        let credentials = config.resolve_credentials(api_key)?;
        log::debug!(
            "Initializing AgentBay executor (api_base: {}, key: {})",
            config.api_base,
            credentials
        );
        let client = AgentBayClient::new(config, credentials)?;
        Ok(Self::with_provider(
            Arc::new(client),
            Some(config.image_id.clone()),
        ))
    }

    pub fn with_provider(provider: Arc<dyn SandboxProvider>, image_id: Option<String>) -> Self {
        Self { provider, image_id }
    }

    pub async fn create_session(&self, labels: Option<&Labels>) -> Result<Session, AgentBayError> {
        let params = CreateSessionParams {
            image_id: self.image_id.clone(),
            labels: labels.cloned(),
        };

        let session = self
            .provider
            .create_session(&params)
            .await
            .map_err(|e| match e {
                AgentBayError::SessionCreationError(_) => e,
                other => AgentBayError::SessionCreationError(other.to_string()),
            })?;

        log::info!("Created AgentBay session {}", session.session_id());
        Ok(session)
    }

    /// Best-effort release; failures are logged and swallowed.
    ///
    /// The delete runs on its own task, so dropping the caller's future
    /// after this point does not abort it.
    pub async fn delete_session(&self, session: Session) {
        let session_id = session.session_id().to_string();
        let cleanup = tokio::spawn(release_session(self.provider.clone(), session));
        if let Err(e) = cleanup.await {
            log::warn!("Cleanup task for AgentBay session {} failed: {}", session_id, e);
        }
    }

    pub async fn run_code(
        &self,
        code: &str,
        language: Language,
        timeout_secs: u32,
        labels: Option<Labels>,
    ) -> Result<String, AgentBayError> {
        let mut request = ExecutionRequest::new(code)
            .with_language(language)
            .with_timeout_secs(timeout_secs);
        request.labels = labels;
        self.execute(&request).await
    }
}

#[async_trait]
impl CodeExecutor for AgentBayCodeExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<String, AgentBayError> {
        request.validate()?;

        let session = self.create_session(request.labels.as_ref()).await?;
        let run_request = RunCodeRequest {
            code: request.code.clone(),
            language: request.language,
            timeout_s: request.timeout_secs,
        };

        log::debug!(
            "Running {} code in session {} (timeout: {}s)",
            request.language,
            session.session_id(),
            request.timeout_secs
        );

        let guard = SessionGuard::arm(self.provider.clone(), &session);
        let outcome = AssertUnwindSafe(self.provider.run_code(&session, &run_request))
            .catch_unwind()
            .await;

        guard.disarm();
        self.delete_session(session).await;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(panic) => std::panic::resume_unwind(panic),
        };

        match outcome {
            Ok(outcome) if outcome.success => Ok(outcome.result),
            Ok(outcome) => {
                let message = outcome
                    .error_message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "execution reported failure without a message".to_string());
                log::error!("AgentBay execution failed: {}", message);
                Err(AgentBayError::ExecutionError(message))
            }
            Err(AgentBayError::ExecutionError(message)) => {
                log::error!("AgentBay execution failed: {}", message);
                Err(AgentBayError::ExecutionError(message))
            }
            Err(other) => {
                log::error!("AgentBay execution fault: {}", other);
                Err(AgentBayError::ExecutionError(other.to_string()))
            }
        }
    }
}
