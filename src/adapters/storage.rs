use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Filesystem storage rooted at a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        tracing::debug!("Reading {}", full_path.display());
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::PricingError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_file_relative_to_base() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("models")).unwrap();
        std::fs::write(dir.path().join("models/features.json"), b"[]").unwrap();

        let storage = LocalStorage::new(dir.path());
        let data = storage.read_file("models/features.json").await.unwrap();
        assert_eq!(data, b"[]");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        match storage.read_file("nope.json").await {
            Err(PricingError::IoError(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("expected IoError, got {other:?}"),
        }
    }
}
