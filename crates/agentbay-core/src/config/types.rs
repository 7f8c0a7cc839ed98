//! Configuration types for the AgentBay client
//!
//! This module contains all the configuration structures that can be loaded
//! from YAML or assembled from the process environment.

use crate::errors::AgentBayError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_API_KEY_ENV: &str = "AGENTBAY_API_KEY";
pub const API_BASE_ENV: &str = "AGENTBAY_API_BASE";
pub const DEFAULT_API_BASE: &str = "https://wuyingai.cn-shanghai.aliyuncs.com";
pub const DEFAULT_IMAGE_ID: &str = "code-space-debian-12";

/// Provider API key. Never printed in full.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(String);

impl Credentials {
    /// Returns `None` for empty or whitespace-only keys.
    pub fn new(api_key: impl Into<String>) -> Option<Self> {
        let api_key = api_key.into();
        let trimmed = api_key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        if self.0.chars().count() > 10 {
            let prefix: String = self.0.chars().take(10).collect();
            format!("{}...", prefix)
        } else {
            "***".to_string()
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credentials").field(&self.masked()).finish()
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Top-level client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentBayConfig {
    /// Explicit API key. Prefer `api_key_env` so keys stay out of config files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<Credentials>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Image used when provisioning code sessions
    #[serde(default = "default_image_id")]
    pub image_id: String,

    /// Dotenv-style files loaded before credentials are resolved
    #[serde(default)]
    pub env_files: Vec<PathBuf>,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Transport slack added on top of the execution timeout
    #[serde(default = "default_execution_grace_secs")]
    pub execution_grace_secs: u64,
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_image_id() -> String {
    DEFAULT_IMAGE_ID.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_execution_grace_secs() -> u64 {
    15
}

impl Default for AgentBayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            api_base: default_api_base(),
            image_id: default_image_id(),
            env_files: Vec::new(),
            connect_timeout_secs: default_connect_timeout_secs(),
            execution_grace_secs: default_execution_grace_secs(),
        }
    }
}

impl AgentBayConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Credentials::new(api_key);
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_image_id(mut self, image_id: impl Into<String>) -> Self {
        self.image_id = image_id.into();
        self
    }

    /// Resolve the API key: explicit argument, then `api_key`, then `api_key_env`.
    pub fn resolve_credentials(
        &self,
        explicit: Option<String>,
    ) -> Result<Credentials, AgentBayError> {
        if let Some(credentials) = explicit.and_then(Credentials::new) {
            return Ok(credentials);
        }

        if let Some(credentials) = &self.api_key {
            return Ok(credentials.clone());
        }

        env::var(&self.api_key_env)
            .ok()
            .and_then(Credentials::new)
            .ok_or_else(|| {
                AgentBayError::ConfigError(format!(
                    "{} not configured. Set the environment variable or pass an api_key explicitly",
                    self.api_key_env
                ))
            })
    }

    pub fn validate(&self) -> Result<(), AgentBayError> {
        if self.api_key_env.trim().is_empty() {
            return Err(AgentBayError::ConfigError(
                "api_key_env cannot be empty".to_string(),
            ));
        }

        let api_base = self.api_base.trim();
        if api_base.is_empty() {
            return Err(AgentBayError::ConfigError(
                "api_base cannot be empty".to_string(),
            ));
        }
        if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
            return Err(AgentBayError::ConfigError(format!(
                "api_base must be an http(s) URL, got '{}'",
                api_base
            )));
        }

        if self.image_id.trim().is_empty() {
            return Err(AgentBayError::ConfigError(
                "image_id cannot be empty".to_string(),
            ));
        }

        if self.connect_timeout_secs == 0 {
            return Err(AgentBayError::ConfigError(
                "connect_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
