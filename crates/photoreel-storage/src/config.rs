//! Backend selection.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::error::{StorageError, StorageResult};
use crate::file::FileStorage;
use crate::memory::MemStorage;
use crate::store::PhotoStore;

/// Available storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

impl FromStr for StorageBackend {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "file" | "fs" => Ok(Self::File),
            other => Err(StorageError::config_error(format!(
                "unknown storage backend: {}",
                other
            ))),
        }
    }
}

/// Configuration for the photo store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Which backend to build
    pub backend: StorageBackend,
    /// Data directory for the file backend
    pub data_dir: PathBuf,
    /// Seed sample photos into an empty memory store
    pub seed_samples: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
            seed_samples: true,
        }
    }
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            backend: match std::env::var("STORAGE_BACKEND") {
                Ok(value) => value.parse()?,
                Err(_) => StorageBackend::Memory,
            },
            data_dir: std::env::var("STORAGE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            seed_samples: std::env::var("STORAGE_SEED_SAMPLES")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        })
    }

    /// Build the configured backend.
    pub async fn open(&self) -> StorageResult<Arc<dyn PhotoStore>> {
        let store: Arc<dyn PhotoStore> = match self.backend {
            StorageBackend::Memory if self.seed_samples => Arc::new(MemStorage::with_samples()),
            StorageBackend::Memory => Arc::new(MemStorage::new()),
            StorageBackend::File => Arc::new(FileStorage::open(&self.data_dir).await?),
        };
        info!(backend = store.backend_name(), "Photo store ready");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!("FILE".parse::<StorageBackend>().unwrap(), StorageBackend::File);
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    #[tokio::test]
    async fn test_open_selects_backend() {
        let memory = StorageConfig::default().open().await.unwrap();
        assert_eq!(memory.backend_name(), "memory");
        assert_eq!(memory.get_photos().await.unwrap().len(), 10);

        let dir = TempDir::new().unwrap();
        let file = StorageConfig {
            backend: StorageBackend::File,
            data_dir: dir.path().to_path_buf(),
            seed_samples: true,
        }
        .open()
        .await
        .unwrap();
        assert_eq!(file.backend_name(), "file");
        assert!(file.get_photos().await.unwrap().is_empty());
    }
}
