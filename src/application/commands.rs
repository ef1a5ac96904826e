//! Data Transfer Objects for application layer

use serde::Serialize;
use std::path::PathBuf;

use crate::application::ValidationError;
use crate::core::config::{Config, validate_api_name};
use crate::generation::GenerationMetadata;

/// Request to generate a server implementation
#[derive(Debug, Clone)]
pub struct GenerateServerRequest {
    pub api_name: String,
    /// Local path or http(s) URL
    pub spec_source: String,
    pub output_dir: PathBuf,
    pub include_operations: Vec<String>,
    pub exclude_operations: Vec<String>,
    pub prompts_file: Option<PathBuf>,
}

impl GenerateServerRequest {
    pub fn from_config(config: &Config) -> Result<Self, ValidationError> {
        let spec_source = config
            .spec_source
            .clone()
            .ok_or_else(|| ValidationError::MissingField("spec_source".to_string()))?;

        Ok(Self {
            api_name: config.api_name.clone(),
            spec_source,
            output_dir: config.output_dir.clone(),
            include_operations: config.include_operations.clone(),
            exclude_operations: config.exclude_operations.clone(),
            prompts_file: config.prompts_file.clone(),
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_api_name(&self.api_name)
            .map_err(|e| ValidationError::InvalidApiName(e.to_string()))?;

        if self.spec_source.trim().is_empty() {
            return Err(ValidationError::MissingField("spec_source".to_string()));
        }

        Ok(())
    }
}

/// Response from server generation
#[derive(Debug, Clone, Serialize)]
pub struct GenerateServerResponse {
    pub artifacts_count: usize,
    pub output_path: PathBuf,
    pub server_path: PathBuf,
    pub metadata: GenerationMetadata,
}
