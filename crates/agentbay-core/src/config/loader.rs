//! Configuration loader for YAML files and environment resolution
//!
//! This module handles loading configuration from YAML files, dotenv-style
//! env files and process environment overrides.

use crate::config::types::*;
use crate::errors::AgentBayError;
use std::env;
use std::path::Path;
use tokio::fs;

/// Configuration loader with environment resolution
pub struct ConfigLoader;

impl ConfigLoader {
    /// Build a configuration from defaults plus environment overrides
    pub fn from_env() -> Result<AgentBayConfig, AgentBayError> {
        let mut config = AgentBayConfig::default();
        Self::resolve_environment(&mut config, None)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<AgentBayConfig, AgentBayError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).await.map_err(|e| {
            AgentBayError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_str(&content, path.parent())
    }

    /// Load configuration from a YAML string. Relative env file paths are
    /// resolved against `base_dir` when given.
    pub fn from_str(
        content: &str,
        base_dir: Option<&Path>,
    ) -> Result<AgentBayConfig, AgentBayError> {
        let mut config: AgentBayConfig = serde_yaml::from_str(content).map_err(|e| {
            AgentBayError::ConfigError(format!("Failed to parse YAML config: {}", e))
        })?;

        Self::resolve_environment(&mut config, base_dir)?;
        config.validate()?;

        Ok(config)
    }

    fn resolve_environment(
        config: &mut AgentBayConfig,
        base_dir: Option<&Path>,
    ) -> Result<(), AgentBayError> {
        for env_file in &config.env_files {
            let env_file = match base_dir {
                Some(dir) if env_file.is_relative() => dir.join(env_file),
                _ => env_file.clone(),
            };
            if env_file.exists() {
                let loaded = Self::load_env_file(&env_file)?;
                log::debug!("Loaded {} variables from {}", loaded, env_file.display());
            } else {
                log::warn!("Env file {} not found, skipping", env_file.display());
            }
        }

        if let Ok(api_base) = env::var(API_BASE_ENV) {
            if !api_base.trim().is_empty() {
                config.api_base = api_base.trim().trim_end_matches('/').to_string();
            }
        }

        Ok(())
    }

    /// Load `KEY=VALUE` lines into the process environment.
    ///
    /// Variables already set in the environment win over the file. Returns the
    /// number of variables that were newly set.
    pub fn load_env_file<P: AsRef<Path>>(path: P) -> Result<usize, AgentBayError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AgentBayError::ConfigError(format!(
                "Failed to read env file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let mut loaded = 0;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if key.is_empty() || env::var_os(key).is_some() {
                    continue;
                }
                env::set_var(key, value);
                loaded += 1;
            }
        }

        Ok(loaded)
    }
}
