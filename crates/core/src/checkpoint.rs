//! Whole-file checkpointing of the result set.
//!
//! Every [`CheckpointStore::persist`] writes the full set to a temp file in the
//! target directory and renames it over the output, so the output is either
//! the previous snapshot or the new one, never a partial write.

use std::path::{Path, PathBuf};

use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::{Result, VloglineError},
    types::ResultSet,
};

#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the output with a snapshot of `results`.
    pub async fn persist(&self, results: &ResultSet) -> Result<()> {
        let json = serde_json::to_string_pretty(results)?;
        let temp = self.temp_path();

        if let Err(source) = self.write_then_rename(&temp, json.as_bytes()).await {
            let _ = fs::remove_file(&temp).await;
            return Err(VloglineError::CheckpointFailed {
                path: self.path.clone(),
                source,
            });
        }

        debug!(path = %self.path.display(), results = results.len(), "checkpoint written");
        Ok(())
    }

    /// Read a previous checkpoint. A missing file is an empty set.
    pub async fn load(&self) -> Result<ResultSet> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ResultSet::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "checkpoint".to_string());
        self.path
            .with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
    }

    async fn write_then_rename(&self, temp: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(temp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(temp, &self.path).await
    }
}
