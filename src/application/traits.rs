//! Port interfaces for the application layer

use async_trait::async_trait;
use std::path::Path;

use crate::openapi::{Prompt, Tool};

/// Fetches the raw text of a spec document
#[async_trait]
pub trait OpenApiLoader: Send + Sync {
    /// Load the document named by `source` (a path or a URL)
    async fn load(&self, source: &str) -> crate::core::Result<String>;
}

/// Produces prompt records for a set of tools
#[async_trait]
pub trait PromptSource: Send + Sync {
    async fn prompts_for(&self, tools: &[Tool]) -> crate::core::Result<Vec<Prompt>>;
}

#[async_trait]
impl PromptSource for crate::prompts::PromptSynthesizer {
    async fn prompts_for(&self, tools: &[Tool]) -> crate::core::Result<Vec<Prompt>> {
        self.synthesize(tools).await
    }
}

/// Service for writing generated artifacts to the output destination
#[async_trait]
pub trait OutputService: Send + Sync {
    /// Write all artifacts to the output destination
    async fn write_artifacts(
        &self,
        artifacts: &[crate::generation::Artifact],
    ) -> Result<(), crate::application::ApplicationError>;

    /// Ensure a directory exists
    async fn ensure_directory(
        &self,
        path: &Path,
    ) -> Result<(), crate::application::ApplicationError>;
}
