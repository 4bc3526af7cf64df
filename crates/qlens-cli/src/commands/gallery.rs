use anyhow::Result;

use qlens_core::repository::ArtifactRepository;
use qlens_infrastructure::FsArtifactRepository;

/// Lists the stored artifacts, oldest first.
pub async fn run() -> Result<()> {
    let repository = FsArtifactRepository::default_location().await?;
    let artifacts = repository.list_all().await?;

    if artifacts.is_empty() {
        println!("no artifacts captured yet");
        return Ok(());
    }

    for artifact in artifacts {
        println!(
            "{}  {}  mode {:<8}  register {}  weight {:.4}",
            artifact.timestamp, artifact.id, artifact.mode, artifact.bits, artifact.weight
        );
    }

    Ok(())
}
