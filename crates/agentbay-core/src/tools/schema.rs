//! JSON Schema validation of tool arguments

use jsonschema::{JSONSchema, ValidationError};
use serde_json::Value;

use crate::errors::AgentBayError;

/// A tool's input schema, compiled once and reused for every call.
pub struct ArgumentValidator {
    tool_name: String,
    compiled: JSONSchema,
}

impl ArgumentValidator {
    pub fn compile(tool_name: &str, schema: &Value) -> Result<Self, AgentBayError> {
        let compiled = JSONSchema::compile(schema).map_err(|e| {
            AgentBayError::InternalError(format!(
                "Invalid input schema for '{}': {}",
                tool_name, e
            ))
        })?;

        Ok(Self {
            tool_name: tool_name.to_string(),
            compiled,
        })
    }

    /// Check `arguments` against the compiled schema.
    pub fn validate(&self, arguments: &Value) -> Result<(), AgentBayError> {
        if let Err(errors) = self.compiled.validate(arguments) {
            let error_messages = format_validation_errors(errors);
            let error_msg = format!(
                "Invalid arguments for '{}': {}",
                self.tool_name,
                error_messages.join("; ")
            );
            log::debug!("{}", error_msg);
            return Err(AgentBayError::ValidationError(error_msg));
        }

        Ok(())
    }
}

fn format_validation_errors<'a>(errors: impl Iterator<Item = ValidationError<'a>>) -> Vec<String> {
    errors
        .map(|error| {
            let path = if error.instance_path.to_string().is_empty() {
                "root".to_string()
            } else {
                error.instance_path.to_string()
            };
            format!("At '{}': {}", path, error)
        })
        .collect()
}
