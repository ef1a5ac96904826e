//! Core types for the generation domain

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A generated file, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
    /// Unix permission bits applied after writing
    pub permissions: Option<u32>,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            permissions: None,
        }
    }
}

/// Summary of one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub api_name: String,
    pub server_file: String,
    pub tool_count: usize,
    pub prompt_count: usize,
    pub model_count: usize,
    pub required_secrets: Vec<String>,
}

/// Result of code generation
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub artifacts: Vec<Artifact>,
    pub metadata: GenerationMetadata,
}

impl GenerationResult {
    /// The rendered server source, always the first artifact
    pub fn server_source(&self) -> Option<&str> {
        self.artifacts.first().map(|a| a.content.as_str())
    }
}
