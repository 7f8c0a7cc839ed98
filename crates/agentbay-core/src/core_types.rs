use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::AgentBayError;

/// Opaque provider-side session labels. Passed through untouched.
pub type Labels = HashMap<String, String>;

pub const MIN_TIMEOUT_SECS: u32 = 1;
pub const MAX_TIMEOUT_SECS: u32 = 60;
pub const DEFAULT_TIMEOUT_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    JavaScript,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = AgentBayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "python" => Ok(Language::Python),
            "javascript" => Ok(Language::JavaScript),
            _ => Err(AgentBayError::ValidationError(
                "language must be either python or javascript".to_string(),
            )),
        }
    }
}

/// A single code execution request, validated before any remote call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub code: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
}

fn default_timeout_secs() -> u32 {
    DEFAULT_TIMEOUT_SECS
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: Language::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            labels: None,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u32) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn validate(&self) -> Result<(), AgentBayError> {
        if self.code.trim().is_empty() {
            return Err(AgentBayError::ValidationError(
                "code cannot be empty".to_string(),
            ));
        }

        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(AgentBayError::ValidationError(format!(
                "timeout_s must be between {} and {} seconds, got {}",
                MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS, self.timeout_secs
            )));
        }

        Ok(())
    }
}

/// Raw `agentbay_run_code` arguments as an agent sends them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunCodeInput {
    pub code: String,
    #[serde(default = "default_language_name")]
    pub language: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_s: u32,
    #[serde(default)]
    pub labels: Option<Labels>,
}

fn default_language_name() -> String {
    Language::default().as_str().to_string()
}

impl RunCodeInput {
    pub fn from_value(arguments: serde_json::Value) -> Result<Self, AgentBayError> {
        serde_json::from_value(arguments)
            .map_err(|e| AgentBayError::ValidationError(format!("Invalid run_code input: {}", e)))
    }

    /// Normalize the language and check bounds.
    pub fn into_request(self) -> Result<ExecutionRequest, AgentBayError> {
        let request = ExecutionRequest {
            code: self.code,
            language: self.language.parse()?,
            timeout_secs: self.timeout_s,
            labels: self.labels,
        };
        request.validate()?;
        Ok(request)
    }
}
