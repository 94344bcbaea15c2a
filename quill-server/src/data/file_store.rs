use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::profile::FileRef;

/// Storage backend for uploaded files. Mirrors the hosted file-store
/// contract: upload bytes under a path, get back a reference with a public
/// URL; delete by path.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<FileRef, DomainError>;
    async fn delete(&self, path: &str) -> Result<(), DomainError>;
}

/// Local-disk backend. Files live under `root`, and are served back under
/// `public_base_url` by the `/files` route.
#[derive(Clone)]
pub struct LocalFileStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn resolve(&self, path: &str) -> Result<PathBuf, DomainError> {
        validate_path(path)?;
        Ok(self.root.join(path))
    }
}

fn validate_path(path: &str) -> Result<(), DomainError> {
    let ok = !path.is_empty()
        && !Path::new(path).is_absolute()
        && path
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..");
    if ok {
        Ok(())
    } else {
        Err(DomainError::Validation(format!("invalid storage path: {path}")))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<FileRef, DomainError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Internal(format!("storage error: {}", e)))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| DomainError::Internal(format!("storage error: {}", e)))?;

        debug!(path, content_type, size = bytes.len(), "file stored");
        Ok(FileRef {
            id: Uuid::new_v4(),
            path: path.to_string(),
            url: format!("{}/{}", self.public_base_url, path),
        })
    }

    async fn delete(&self, path: &str) -> Result<(), DomainError> {
        let target = self.resolve(path)?;
        tokio::fs::remove_file(&target)
            .await
            .map_err(|e| DomainError::Internal(format!("storage error: {}", e)))?;
        info!(path, "file deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_traversal_and_absolute_paths() {
        for path in ["", "/etc/passwd", "a/../b", "./x", "a//b"] {
            assert!(validate_path(path).is_err(), "accepted {path:?}");
        }
        assert!(validate_path("avatars/abc/def.png").is_ok());
    }
}
