//! Filesystem-backed ArtifactRepository implementation.
//!
//! Directory structure:
//! ```text
//! base_dir/
//! └── artifacts/
//!     ├── <artifact-uuid-1>.json
//!     └── <artifact-uuid-2>.json
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use qlens_core::artifact::Artifact;
use qlens_core::repository::ArtifactRepository;
use qlens_core::{QlensError, Result};

use crate::paths::QlensPaths;

/// One JSON file per captured artifact.
pub struct FsArtifactRepository {
    dir: PathBuf,
}

impl FsArtifactRepository {
    /// Creates a repository at the default artifact directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be resolved or created.
    pub async fn default_location() -> Result<Self> {
        let dir = QlensPaths::artifact_dir()
            .map_err(|e| QlensError::config(e.to_string()))?;
        Self::new(&dir).await
    }

    /// Creates a repository rooted at a custom directory (for testing).
    pub async fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, artifact_id: &str) -> PathBuf {
        self.dir.join(format!("{artifact_id}.json"))
    }
}

#[async_trait]
impl ArtifactRepository for FsArtifactRepository {
    async fn find_by_id(&self, artifact_id: &str) -> Result<Option<Artifact>> {
        match fs::read_to_string(self.path_for(artifact_id)).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, artifact: &Artifact) -> Result<()> {
        let content = serde_json::to_string_pretty(artifact)?;
        fs::write(self.path_for(&artifact.id), content).await?;
        Ok(())
    }

    async fn delete(&self, artifact_id: &str) -> Result<()> {
        match fs::remove_file(self.path_for(artifact_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_all(&self) -> Result<Vec<Artifact>> {
        let mut artifacts = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path).await?;
            match serde_json::from_str(&content) {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => {
                    // A corrupt entry should not hide the rest of the gallery.
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable artifact");
                }
            }
        }

        artifacts.sort_by(|a: &Artifact, b: &Artifact| a.timestamp.cmp(&b.timestamp));
        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlens_core::artifact::OverlayMode;
    use qlens_core::register::BitRegister;

    fn artifact(bits: &str) -> Artifact {
        let register: BitRegister = bits.parse().unwrap();
        Artifact::new("img-data", OverlayMode::Standard, &register)
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsArtifactRepository::new(dir.path()).await.unwrap();

        let stored = artifact("1010101010");
        repo.save(&stored).await.unwrap();

        let loaded = repo.find_by_id(&stored.id).await.unwrap().unwrap();
        assert_eq!(loaded.bits, "1010101010");
        assert_eq!(loaded.weight, stored.weight);
    }

    #[tokio::test]
    async fn test_find_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsArtifactRepository::new(dir.path()).await.unwrap();
        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsArtifactRepository::new(dir.path()).await.unwrap();

        let stored = artifact("0000011111");
        repo.save(&stored).await.unwrap();

        repo.delete(&stored.id).await.unwrap();
        repo.delete(&stored.id).await.unwrap();
        assert!(repo.find_by_id(&stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all_skips_corrupt_entries() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsArtifactRepository::new(dir.path()).await.unwrap();

        repo.save(&artifact("1111100000")).await.unwrap();
        std::fs::write(dir.path().join("broken.json"), "not json").unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
