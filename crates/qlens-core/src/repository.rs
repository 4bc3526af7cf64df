//! Repository traits implemented by the infrastructure layer.

use async_trait::async_trait;

use crate::artifact::Artifact;
use crate::error::Result;

/// Persistence seam for captured artifacts.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Finds an artifact by its ID. Returns `None` if it does not exist.
    async fn find_by_id(&self, artifact_id: &str) -> Result<Option<Artifact>>;

    /// Saves an artifact, overwriting any existing one with the same ID.
    async fn save(&self, artifact: &Artifact) -> Result<()>;

    /// Deletes an artifact. No-op if it does not exist.
    async fn delete(&self, artifact_id: &str) -> Result<()>;

    /// Lists all stored artifacts.
    async fn list_all(&self) -> Result<Vec<Artifact>>;
}
