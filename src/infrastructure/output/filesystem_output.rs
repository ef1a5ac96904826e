//! Filesystem-based output service implementation

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::{ApplicationError, OutputService};
use crate::generation::Artifact;

fn output_error(action: &str, path: &Path, e: std::io::Error) -> ApplicationError {
    ApplicationError::OutputError(format!("Failed to {action} {}: {e}", path.display()))
}

/// Output service that writes artifacts to the filesystem
pub struct FileSystemOutputService;

impl FileSystemOutputService {
    pub fn new() -> Self {
        Self
    }

    async fn write_one(&self, artifact: &Artifact) -> Result<(), ApplicationError> {
        let path = artifact.path.as_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| output_error("create directory", parent, e))?;
        }

        let mut file = fs::File::create(path)
            .await
            .map_err(|e| output_error("create file", path, e))?;
        file.write_all(artifact.content.as_bytes())
            .await
            .map_err(|e| output_error("write file", path, e))?;
        file.flush()
            .await
            .map_err(|e| output_error("flush file", path, e))?;

        #[cfg(unix)]
        if let Some(mode) = artifact.permissions {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
                .await
                .map_err(|e| output_error("set permissions on", path, e))?;
        }

        tracing::debug!(path = %path.display(), bytes = artifact.content.len(), "Wrote artifact");
        Ok(())
    }
}

#[async_trait]
impl OutputService for FileSystemOutputService {
    async fn write_artifacts(&self, artifacts: &[Artifact]) -> Result<(), ApplicationError> {
        for artifact in artifacts {
            self.write_one(artifact).await?;
        }
        Ok(())
    }

    async fn ensure_directory(&self, path: &Path) -> Result<(), ApplicationError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| output_error("create directory", path, e))
    }
}

impl Default for FileSystemOutputService {
    fn default() -> Self {
        Self::new()
    }
}
