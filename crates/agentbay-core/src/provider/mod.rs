//! Remote sandbox provider abstractions.
//!
//! The provider owns sessions: it provisions them, runs code inside them and
//! tears them down. Everything in this crate talks to it through the
//! [`SandboxProvider`] and [`RetrievalProvider`] traits so tests can swap in
//! an in-memory double.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core_types::{Labels, Language};
use crate::errors::AgentBayError;

pub mod http;

pub use http::AgentBayClient;

/// Handle to a provisioned remote session.
///
/// Not `Clone`: [`SandboxProvider::delete_session`] consumes it, so a handle
/// can be released at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct Session {
    session_id: String,
    request_id: Option<String>,
}

impl Session {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateSessionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunCodeRequest {
    pub code: String,
    pub language: Language,
    pub timeout_s: u32,
}

/// Provider verdict for one execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunCodeOutcome {
    pub success: bool,
    #[serde(default)]
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl RunCodeOutcome {
    pub fn success(result: impl Into<String>) -> Self {
        Self {
            success: true,
            result: result.into(),
            ..Default::default()
        }
    }

    pub fn failure(error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(error_message.into()),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait SandboxProvider: Send + Sync {
    async fn create_session(&self, params: &CreateSessionParams)
        -> Result<Session, AgentBayError>;

    async fn run_code(
        &self,
        session: &Session,
        request: &RunCodeRequest,
    ) -> Result<RunCodeOutcome, AgentBayError>;

    async fn delete_session(&self, session: Session) -> Result<(), AgentBayError>;
}

#[async_trait]
pub trait RetrievalProvider: Send + Sync {
    async fn retrieve_and_summarize(&self, query: &str, top_k: u32)
        -> Result<Value, AgentBayError>;
}
