//! HTTP-based spec loader

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::application::OpenApiLoader;
use crate::core::error::{Error, Result};

/// Loads spec documents from HTTP/HTTPS URLs
pub struct HttpOpenApiLoader {
    client: Client,
}

impl HttpOpenApiLoader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl OpenApiLoader for HttpOpenApiLoader {
    async fn load(&self, source: &str) -> Result<String> {
        let url = url::Url::parse(source)
            .map_err(|e| Error::load(format!("Invalid URL {source}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::load(format!(
                "HttpOpenApiLoader only handles HTTP(S) URLs, got: {source}"
            )));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::load(format!("Failed to fetch spec from {source}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::load(format!("HTTP {status} when fetching {source}")));
        }

        let content = response
            .text()
            .await
            .map_err(|e| Error::load(format!("Failed to read response body: {e}")))?;
        tracing::debug!(source, bytes = content.len(), "Fetched spec");
        Ok(content)
    }
}
