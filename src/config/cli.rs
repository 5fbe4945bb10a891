use crate::domain::model::EmissionResult;
use crate::domain::ports::{SnapshotRenderer, Storage};
use crate::utils::error::{EstimatorError, Result};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

/// 讀取外部工具已經產生好的 PDF 當作報告快照
#[derive(Debug, Clone)]
pub struct FileSnapshot<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> FileSnapshot<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> SnapshotRenderer for FileSnapshot<S> {
    async fn render(&self, result: &EmissionResult) -> Result<Vec<u8>> {
        tracing::debug!(
            "Loading snapshot '{}' for a {:.2} kg CO₂ report",
            self.path,
            result.total_emissions_kg
        );

        let data = self
            .storage
            .read_file(&self.path)
            .await
            .map_err(|e| EstimatorError::SnapshotError {
                message: format!("cannot read '{}': {}", self.path, e),
            })?;

        if !data.starts_with(b"%PDF") {
            return Err(EstimatorError::SnapshotError {
                message: format!("'{}' is not a PDF document", self.path),
            });
        }

        Ok(data)
    }
}
