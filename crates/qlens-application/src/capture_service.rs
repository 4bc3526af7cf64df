//! Artifact capture.
//!
//! Captures read the *currently published* register at the moment of the
//! user action; an artifact has no binding to the job that produced its bits
//! beyond "most recent at capture time."

use std::sync::Arc;

use tokio::sync::RwLock;

use qlens_core::artifact::{Artifact, OverlayMode};
use qlens_core::event_log::{EventLogHandle, LogCategory};
use qlens_core::register::BitRegister;
use qlens_core::repository::ArtifactRepository;
use qlens_core::{QlensError, Result};

/// Creates artifacts and holds the in-memory gallery.
pub struct CaptureService {
    feed: Arc<RwLock<BitRegister>>,
    log: EventLogHandle,
    gallery: RwLock<Vec<Artifact>>,
    repository: Option<Arc<dyn ArtifactRepository>>,
}

impl CaptureService {
    /// Creates a capture service over the published register feed.
    pub fn new(feed: Arc<RwLock<BitRegister>>, log: EventLogHandle) -> Self {
        Self {
            feed,
            log,
            gallery: RwLock::new(Vec::new()),
            repository: None,
        }
    }

    /// Attaches a persistence backend; without one the gallery is
    /// in-memory only.
    pub fn with_repository(mut self, repository: Arc<dyn ArtifactRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Captures an artifact from an already-encoded frame.
    ///
    /// Image encoding is the caller's responsibility; the payload is carried
    /// opaquely. The register and weight are snapshotted here.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persistence is attached and fails; the
    /// artifact is not added to the gallery in that case.
    pub async fn capture(
        &self,
        image_data: impl Into<String>,
        mode: OverlayMode,
    ) -> Result<Artifact> {
        let register = *self.feed.read().await;
        let artifact = Artifact::new(image_data, mode, &register);

        if let Some(repository) = &self.repository {
            repository.save(&artifact).await?;
        }

        self.gallery.write().await.push(artifact.clone());
        self.log.record(
            LogCategory::Capture,
            format!("Artifact captured in {mode} mode"),
            Some(format!(
                "register {} weight {:.4}",
                artifact.bits, artifact.weight
            )),
        );

        Ok(artifact)
    }

    /// Gallery contents, oldest first.
    pub async fn artifacts(&self) -> Vec<Artifact> {
        self.gallery.read().await.clone()
    }

    /// Removes an artifact from the gallery and from persistence.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the gallery holds no artifact with that ID.
    pub async fn remove(&self, artifact_id: &str) -> Result<()> {
        let mut gallery = self.gallery.write().await;
        let position = gallery
            .iter()
            .position(|a| a.id == artifact_id)
            .ok_or_else(|| QlensError::not_found("artifact", artifact_id))?;
        gallery.remove(position);
        drop(gallery);

        if let Some(repository) = &self.repository {
            repository.delete(artifact_id).await?;
        }

        Ok(())
    }

    /// Empties the in-memory gallery; persisted artifacts are untouched.
    pub async fn clear(&self) {
        self.gallery.write().await.clear();
    }
}
