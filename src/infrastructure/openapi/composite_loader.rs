//! Composite spec loader that dispatches on the source kind

use async_trait::async_trait;

use super::{FileOpenApiLoader, HttpOpenApiLoader};
use crate::application::OpenApiLoader;
use crate::core::error::Result;

/// Loads URLs over HTTP and everything else from disk
pub struct CompositeOpenApiLoader {
    http: HttpOpenApiLoader,
    file: FileOpenApiLoader,
}

impl CompositeOpenApiLoader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: HttpOpenApiLoader::new()?,
            file: FileOpenApiLoader::new(),
        })
    }

    pub fn is_remote(source: &str) -> bool {
        source.starts_with("http://") || source.starts_with("https://")
    }
}

#[async_trait]
impl OpenApiLoader for CompositeOpenApiLoader {
    async fn load(&self, source: &str) -> Result<String> {
        tracing::debug!("CompositeOpenApiLoader: Loading from source: {source}");

        if Self::is_remote(source) {
            tracing::debug!("CompositeOpenApiLoader: Using HTTP loader");
            self.http.load(source).await
        } else {
            tracing::debug!("CompositeOpenApiLoader: Using file loader");
            self.file.load(source).await
        }
    }
}
