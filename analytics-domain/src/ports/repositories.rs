use async_trait::async_trait;

use crate::entities::VisitRecord;

#[async_trait]
pub trait VisitRepository: Send + Sync {
    async fn ping(&self) -> anyhow::Result<()>;
    async fn fetch_visits(&self) -> anyhow::Result<Vec<VisitRecord>>;
}

#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Makes sure the output location exists and is writable.
    async fn prepare(&self) -> anyhow::Result<()>;
    /// Replaces the named artifact atomically.
    async fn write_artifact(&self, name: &str, body: &serde_json::Value) -> anyhow::Result<()>;
    /// Deletes the named artifact; a missing artifact is not an error.
    async fn remove_artifact(&self, name: &str) -> anyhow::Result<()>;
}
