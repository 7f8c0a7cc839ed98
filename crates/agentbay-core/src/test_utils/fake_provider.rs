// src/test_utils/fake_provider.rs
use async_trait::async_trait;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::errors::AgentBayError;
use crate::provider::{
    CreateSessionParams, RunCodeOutcome, RunCodeRequest, SandboxProvider, Session,
};

#[derive(Debug, Clone)]
pub enum RunBehavior {
    /// Return the arguments of `print('...')` / `console.log('...')` calls.
    EchoPrint,
    Succeed(String),
    /// Provider answers with `success: false`.
    Fail(String),
    /// Provider call itself errors out.
    Fault(String),
    Panic,
    /// Sleep, then succeed with an empty result.
    Sleep(Duration),
}

/// In-memory provider that records every call.
pub struct FakeSandboxProvider {
    create_error: Option<String>,
    delete_error: Option<String>,
    run_behavior: RunBehavior,
    next_id: AtomicUsize,
    create_calls: AtomicUsize,
    run_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    events: Mutex<Vec<String>>,
    last_params: Mutex<Option<CreateSessionParams>>,
    last_request: Mutex<Option<RunCodeRequest>>,
}

impl FakeSandboxProvider {
    pub fn new(run_behavior: RunBehavior) -> Self {
        Self {
            create_error: None,
            delete_error: None,
            run_behavior,
            next_id: AtomicUsize::new(1),
            create_calls: AtomicUsize::new(0),
            run_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
            last_params: Mutex::new(None),
            last_request: Mutex::new(None),
        }
    }

    pub fn echo() -> Self {
        Self::new(RunBehavior::EchoPrint)
    }

    pub fn refusing_create(message: &str) -> Self {
        let mut provider = Self::echo();
        provider.create_error = Some(message.to_string());
        provider
    }

    pub fn with_delete_error(mut self, message: &str) -> Self {
        self.delete_error = Some(message.to_string());
        self
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn run_calls(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn last_params(&self) -> Option<CreateSessionParams> {
        self.last_params.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<RunCodeRequest> {
        self.last_request.lock().unwrap().clone()
    }

    fn echo_output(code: &str) -> String {
        let pattern = Regex::new(r#"(?:print|console\.log)\(\s*['"](.*?)['"]\s*\)"#).unwrap();
        pattern
            .captures_iter(code)
            .map(|c| c[1].to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl SandboxProvider for FakeSandboxProvider {
    async fn create_session(
        &self,
        params: &CreateSessionParams,
    ) -> Result<Session, AgentBayError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = Some(params.clone());

        if let Some(message) = &self.create_error {
            self.events.lock().unwrap().push("create:refused".to_string());
            return Err(AgentBayError::SessionCreationError(message.clone()));
        }

        let id = format!("fake-session-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.events.lock().unwrap().push(format!("create:{}", id));
        Ok(Session::new(id))
    }

    async fn run_code(
        &self,
        session: &Session,
        request: &RunCodeRequest,
    ) -> Result<RunCodeOutcome, AgentBayError> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.events
            .lock()
            .unwrap()
            .push(format!("run:{}", session.session_id()));

        match &self.run_behavior {
            RunBehavior::EchoPrint => Ok(RunCodeOutcome::success(Self::echo_output(&request.code))),
            RunBehavior::Succeed(output) => Ok(RunCodeOutcome::success(output.clone())),
            RunBehavior::Fail(message) => Ok(RunCodeOutcome::failure(message.clone())),
            RunBehavior::Fault(message) => Err(AgentBayError::ProviderError(message.clone())),
            RunBehavior::Panic => panic!("simulated provider panic"),
            RunBehavior::Sleep(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(RunCodeOutcome::success(String::new()))
            }
        }
    }

    async fn delete_session(&self, session: Session) -> Result<(), AgentBayError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.events
            .lock()
            .unwrap()
            .push(format!("delete:{}", session.session_id()));

        match &self.delete_error {
            Some(message) => Err(AgentBayError::ProviderError(message.clone())),
            None => Ok(()),
        }
    }
}
