//! Configuration for the AgentBay client
//!
//! Settings come from three places, applied in order: YAML file (optional),
//! dotenv-style env files listed in it, then process environment overrides.

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;


use crate::errors::AgentBayError;
use std::path::Path;

/// Load a configuration from a YAML file
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<AgentBayConfig, AgentBayError> {
    ConfigLoader::from_file(path).await
}
