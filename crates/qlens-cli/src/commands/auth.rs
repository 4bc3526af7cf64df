use anyhow::Result;

use crate::app::AppContext;

/// Validates a credential against the compute backend.
pub async fn run(ctx: &AppContext, token: Option<String>) -> Result<()> {
    let token = ctx.resolve_token(token)?;

    // Link failures are recovered locally and reported through the log.
    match ctx.link.authenticate(&token).await {
        Ok(status) => println!("link status: {status}"),
        Err(err) => println!("authentication failed: {err}"),
    }

    super::print_log(&ctx.log);
    Ok(())
}
