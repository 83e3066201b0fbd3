use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use analytics_domain::ports::ArtifactRepository;

/// Artifacts stored as `<dir>/<name>.json`.
///
/// Writes go to a hidden temp file in the same directory and are renamed into
/// place, so readers see either the old or the new document.
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

#[async_trait]
impl ArtifactRepository for FileArtifactStore {
    async fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("cannot create output dir {}", self.dir.display()))?;
        let marker = self.dir.join(format!(".writable-{}", Uuid::new_v4()));
        fs::write(&marker, b"")
            .await
            .with_context(|| format!("output dir {} is not writable", self.dir.display()))?;
        fs::remove_file(&marker).await?;
        Ok(())
    }

    async fn write_artifact(&self, name: &str, body: &serde_json::Value) -> Result<()> {
        let target = self.path_for(name);
        let temp = self.dir.join(format!(".{}.{}.tmp", name, Uuid::new_v4()));
        let content = serde_json::to_vec_pretty(body)?;
        fs::write(&temp, content)
            .await
            .with_context(|| format!("failed to write {}", temp.display()))?;
        if let Err(err) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(err).with_context(|| format!("failed to replace {}", target.display()));
        }
        Ok(())
    }

    async fn remove_artifact(&self, name: &str) -> Result<()> {
        let target = self.path_for(name);
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to remove {}", target.display())),
        }
    }
}
