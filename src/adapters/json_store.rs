use crate::domain::model::{Filter, RawRecord};
use crate::domain::ports::DocumentStore;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A directory of collection exports: `<collection>.json` holding an array of
/// documents, or `<collection>.jsonl` with one document per line.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_documents(&self, collection: &str) -> Result<Vec<Value>> {
        let array_path = self.root.join(format!("{}.json", collection));
        if tokio::fs::try_exists(&array_path).await? {
            let content = tokio::fs::read(&array_path).await?;
            return Ok(serde_json::from_slice(&content)?);
        }

        let lines_path = self.root.join(format!("{}.jsonl", collection));
        let content = tokio::fs::read_to_string(&lines_path).await?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(EtlError::from))
            .collect()
    }
}

#[async_trait]
impl DocumentStore for JsonDirStore {
    async fn read(&self, filter: &Filter, collection: &str) -> Result<Vec<RawRecord>> {
        tracing::debug!("Reading '{}' from {}", collection, self.root.display());

        let documents = self
            .read_documents(collection)
            .await
            .map_err(|e| EtlError::store_access(collection, e.to_string()))?;

        Ok(documents
            .into_iter()
            .filter_map(RawRecord::from_value)
            .filter(|document| filter.matches(document))
            .collect())
    }
}
