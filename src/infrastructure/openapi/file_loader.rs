//! File-based spec loader
//!
//! This loader handles only file I/O. Decoding and parsing happen in
//! [`crate::openapi::SpecParser`].

use async_trait::async_trait;
use tokio::fs;

use crate::application::OpenApiLoader;
use crate::core::error::{Error, Result};

/// Loads spec documents from local files
pub struct FileOpenApiLoader;

impl FileOpenApiLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OpenApiLoader for FileOpenApiLoader {
    async fn load(&self, source: &str) -> Result<String> {
        let content = fs::read_to_string(source)
            .await
            .map_err(|e| Error::load(format!("Failed to read {source}: {e}")))?;
        tracing::debug!(source, bytes = content.len(), "Read spec file");
        Ok(content)
    }
}

impl Default for FileOpenApiLoader {
    fn default() -> Self {
        Self::new()
    }
}
