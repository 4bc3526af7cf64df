use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use qlens_application::CaptureService;
use qlens_core::artifact::OverlayMode;
use qlens_infrastructure::FsArtifactRepository;

use crate::app::AppContext;

/// Runs a job, then captures the frame with the freshly published register.
pub async fn run(
    ctx: &AppContext,
    frame: &Path,
    mode: OverlayMode,
    remote: bool,
    token: Option<String>,
) -> Result<()> {
    if remote {
        let token = ctx.resolve_token(token)?;
        if let Err(err) = ctx.link.authenticate(&token).await {
            println!("authentication failed: {err}");
        }
    }

    // A failed job keeps the previously published register; the capture is
    // still valid against it.
    if let Err(err) = ctx.jobs.run_job(remote).await {
        println!("job failed: {err}");
    }

    let bytes = std::fs::read(frame)
        .with_context(|| format!("failed to read frame {}", frame.display()))?;
    let image_data = format!("data:image/png;base64,{}", BASE64_STANDARD.encode(&bytes));

    let repository = Arc::new(FsArtifactRepository::default_location().await?);
    let capture =
        CaptureService::new(ctx.jobs.register_feed(), ctx.log.clone()).with_repository(repository);

    let artifact = capture.capture(image_data, mode).await?;
    println!(
        "captured artifact {} (mode {}, register {}, weight {:.4})",
        artifact.id, artifact.mode, artifact.bits, artifact.weight
    );

    super::print_log(&ctx.log);
    Ok(())
}
