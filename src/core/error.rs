//! Error handling for the mcpforge compiler.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. Document-level problems are fatal
//! and surface here; operation-level schema oddities never do, they degrade to
//! placeholder types inside the parser instead.
//!
//! # Examples
//!
//! ```
//! use mcpforge::core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::config("missing api name"))
//! }
//!
//! assert!(might_fail().is_err());
//! ```

use thiserror::Error;

/// Result type for mcpforge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mcpforge operations
#[derive(Debug, Error)]
pub enum Error {
    /// A dialect-required top-level field is missing or empty.
    /// The message always carries a corrective example.
    #[error("{message}")]
    SpecValidation { field: String, message: String },

    /// The input is neither valid JSON nor valid YAML
    #[error("Failed to decode document as JSON or YAML: {0}")]
    Decode(#[from] serde_yaml::Error),

    /// A `$ref` chain points back into itself
    #[error("Circular reference detected while resolving '{reference}'")]
    CircularReference { reference: String },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Template(#[from] tera::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Spec source could not be loaded
    #[error("Failed to load spec: {0}")]
    Load(String),

    /// The external prompt synthesizer failed
    #[error("Prompt synthesis failed: {0}")]
    PromptSynthesis(String),

    /// A session action is not allowed in the current workflow state
    #[error("Cannot {action} while session is {from}")]
    InvalidTransition { from: String, action: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new spec validation error for `field`
    pub fn spec_validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::SpecValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new load error
    pub fn load<S: Into<String>>(msg: S) -> Self {
        Self::Load(msg.into())
    }

    /// Create a new prompt synthesis error
    pub fn prompt_synthesis<S: Into<String>>(msg: S) -> Self {
        Self::PromptSynthesis(msg.into())
    }

    /// True for errors the user must fix in the spec document itself
    pub fn is_spec_error(&self) -> bool {
        matches!(
            self,
            Self::SpecValidation { .. } | Self::Decode(_) | Self::CircularReference { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_spec_validation_displays_message_only() {
        let error = Error::spec_validation("host", "Swagger spec missing required 'host' field");
        assert!(matches!(error, Error::SpecValidation { ref field, .. } if field == "host"));
        assert_eq!(
            error.to_string(),
            "Swagger spec missing required 'host' field"
        );
        assert!(error.is_spec_error());
    }

    #[test]
    fn test_error_config_creation() {
        let error = Error::config("Invalid configuration");
        assert!(matches!(error, Error::Config(_)));
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid configuration"
        );
        assert!(!error.is_spec_error());
    }

    #[test]
    fn test_circular_reference_names_pointer() {
        let error = Error::CircularReference {
            reference: "#/definitions/Node".to_string(),
        };
        assert!(error.to_string().contains("#/definitions/Node"));
    }

    #[test]
    fn test_invalid_transition_display() {
        let error = Error::InvalidTransition {
            from: "Idle".to_string(),
            action: "design prompts".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot design prompts while session is Idle");
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
        assert!(error.to_string().contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_result: std::result::Result<serde_json::Value, _> =
            serde_yaml::from_str("key: [unclosed");
        let error: Error = yaml_result.unwrap_err().into();
        assert!(matches!(error, Error::Decode(_)));
        assert!(error.is_spec_error());
    }
}
