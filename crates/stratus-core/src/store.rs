//! Compiled graph persistence
//!
//! The create/update graph pair is written under `.stratus/` at package
//! time and read back at deploy/remove time. This is the on-disk contract
//! between packaging and the reconciler; a pair already in memory is used
//! as-is.

use crate::error::{CoreError, Result};
use crate::graph::{GraphPair, LogicalGraph};
use std::path::{Path, PathBuf};
use tokio::fs;

const STORE_DIR: &str = ".stratus";
const CREATE_FILE: &str = "create.json";
const UPDATE_FILE: &str = "update.json";

/// Reads and writes the compiled graph pair under a project root
pub struct GraphStore {
    project_root: PathBuf,
}

impl GraphStore {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    pub fn store_dir(&self) -> PathBuf {
        self.project_root.join(STORE_DIR)
    }

    fn create_path(&self) -> PathBuf {
        self.store_dir().join(CREATE_FILE)
    }

    fn update_path(&self) -> PathBuf {
        self.store_dir().join(UPDATE_FILE)
    }

    async fn ensure_store_dir(&self) -> Result<()> {
        let dir = self.store_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created store directory: {}", dir.display());
        }
        Ok(())
    }

    /// Persist both graph documents
    pub async fn save(&self, pair: &GraphPair) -> Result<()> {
        self.ensure_store_dir().await?;
        write_graph(&self.create_path(), &pair.create).await?;
        write_graph(&self.update_path(), &pair.update).await?;
        tracing::debug!(
            create = pair.create.len(),
            update = pair.update.len(),
            "saved compiled graphs"
        );
        Ok(())
    }

    /// Load a previously saved pair
    pub async fn load(&self) -> Result<GraphPair> {
        let pair = GraphPair {
            create: read_graph(&self.create_path()).await?,
            update: read_graph(&self.update_path()).await?,
        };
        pair.validate()?;
        Ok(pair)
    }

    pub fn exists(&self) -> bool {
        self.create_path().exists() && self.update_path().exists()
    }
}

async fn write_graph(path: &Path, graph: &LogicalGraph) -> Result<()> {
    // Write-then-rename so a crash never leaves a torn document behind.
    let tmp = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(graph)?;
    fs::write(&tmp, content).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

async fn read_graph(path: &Path) -> Result<LogicalGraph> {
    if !path.exists() {
        return Err(CoreError::GraphNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_cloud::{BucketSpec, Resource};

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = GraphStore::new(dir.path());

        let mut create = LogicalGraph::new();
        create.insert(
            "svc-bucket",
            Resource::Bucket(BucketSpec {
                name: "artifacts".to_string(),
                region: "cn-shanghai".to_string(),
            }),
        );
        let pair = GraphPair {
            create,
            update: LogicalGraph::new(),
        };

        store.save(&pair).await.unwrap();
        assert!(store.exists());

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, pair);
    }

    #[tokio::test]
    async fn load_without_save_reports_missing_graph() {
        let dir = tempfile::tempdir().unwrap();
        let store = GraphStore::new(dir.path());
        assert!(!store.exists());
        assert!(matches!(
            store.load().await,
            Err(CoreError::GraphNotFound { .. })
        ));
    }
}
