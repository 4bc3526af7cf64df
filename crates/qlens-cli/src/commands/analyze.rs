use std::path::Path;

use anyhow::{Context, Result};

use qlens_core::artifact::OverlayMode;
use qlens_infrastructure::SecretStorage;
use qlens_link::FrameAnalyzer;

use crate::app::AppContext;

/// Sends a frame to the analysis service with the current mode and weight.
///
/// A local job runs first so the prompt carries a live weight, the same
/// order the overlay follows.
pub async fn run(ctx: &AppContext, frame: &Path, mode: OverlayMode) -> Result<()> {
    let secret = SecretStorage::new()
        .ok()
        .and_then(|storage| storage.load().ok())
        .and_then(|secrets| secrets.analysis)
        .context("no analysis key; add it to secret.json")?;
    let analyzer = FrameAnalyzer::new(&secret)?;

    if let Err(err) = ctx.jobs.run_job(false).await {
        println!("job failed: {err}");
    }
    let weight = ctx.jobs.current_weight().await;

    let bytes = std::fs::read(frame)
        .with_context(|| format!("failed to read frame {}", frame.display()))?;

    match analyzer.describe_frame(&bytes, mode, weight).await {
        Ok(text) => println!("{text}"),
        Err(err) => println!("analysis failed: {err}"),
    }

    Ok(())
}
