//! File-backed host capabilities.
//!
//! Each invocation of the binary stands in for the host: the pod spec and the
//! relation bag land in files, status goes to the log.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;
use zk_core::{Error, Result};
use zk_reconciler::{PodSpec, RelationChannel, SpecSink, StatusSink, UnitStatus};

/// Writes each submitted pod spec to a JSON file.
#[derive(Debug, Clone)]
pub struct FileSpecSink {
    path: PathBuf,
}

impl FileSpecSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SpecSink for FileSpecSink {
    async fn submit(&self, spec: &PodSpec) -> Result<()> {
        let text = serde_json::to_string_pretty(spec)?;
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| Error::submission(format!("{}: {e}", self.path.display())))?;
        info!(path = %self.path.display(), "Pod spec written");
        Ok(())
    }
}

/// Emits status through tracing and remembers the latest value.
#[derive(Debug, Default)]
pub struct LogStatusSink {
    current: Mutex<UnitStatus>,
}

impl LogStatusSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> UnitStatus {
        self.current.lock().await.clone()
    }
}

#[async_trait]
impl StatusSink for LogStatusSink {
    async fn set_status(&self, status: &UnitStatus) -> Result<()> {
        info!(status = status.name(), message = status.message(), "Unit status");
        *self.current.lock().await = status.clone();
        Ok(())
    }
}

/// Relation data bag stored as a flat JSON object.
#[derive(Debug, Clone)]
pub struct FileRelation {
    path: PathBuf,
}

impl FileRelation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the whole bag; a missing file is an empty bag.
    ///
    /// # Errors
    ///
    /// Returns `Error::Relation` if the file cannot be read or parsed.
    pub async fn read(&self) -> Result<BTreeMap<String, String>> {
        read_bag(&self.path).await
    }
}

#[async_trait]
impl RelationChannel for FileRelation {
    async fn publish(&self, key: &str, value: &str) -> Result<()> {
        let mut bag = read_bag(&self.path).await?;
        bag.insert(key.to_string(), value.to_string());
        let text = serde_json::to_string_pretty(&bag)?;
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| Error::relation(format!("{}: {e}", self.path.display())))
    }
}

async fn read_bag(path: &Path) -> Result<BTreeMap<String, String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => serde_json::from_str(&text)
            .map_err(|e| Error::relation(format!("{}: {e}", path.display()))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(Error::relation(format!("{}: {e}", path.display()))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[tokio::test]
    async fn test_file_relation_merges_keys() {
        let dir = tempfile::tempdir().unwrap();
        let relation = FileRelation::new(dir.path().join("relation.json"));

        relation.publish("host", "zookeeper").await.unwrap();
        relation.publish("port", "2181").await.unwrap();
        relation.publish("port", "2182").await.unwrap();

        let bag = relation.read().await.unwrap();
        assert_eq!(bag.get("host").map(String::as_str), Some("zookeeper"));
        assert_eq!(bag.get("port").map(String::as_str), Some("2182"));
        assert_eq!(bag.len(), 2);
    }

    #[tokio::test]
    async fn test_spec_sink_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSpecSink::new(dir.path().join("missing").join("spec.json"));
        let spec = PodSpec {
            version: 2,
            containers: Vec::new(),
        };
        assert!(matches!(
            sink.submit(&spec).await,
            Err(Error::Submission { .. })
        ));
    }

    #[tokio::test]
    async fn test_log_status_sink_keeps_latest() {
        let sink = LogStatusSink::new();
        sink.set_status(&UnitStatus::maintenance("Applying pod spec"))
            .await
            .unwrap();
        sink.set_status(&UnitStatus::active()).await.unwrap();
        assert_eq!(sink.current().await, UnitStatus::active());
    }
}
