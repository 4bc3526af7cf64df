use anyhow::Result;

use qlens_core::register::derive_weight;

use crate::app::AppContext;

/// Runs one job and prints the resulting register and weight.
///
/// Remote execution authenticates first; if the link cannot be established
/// the job degrades to the local path and says so in the log.
pub async fn run(ctx: &AppContext, remote: bool, token: Option<String>) -> Result<()> {
    if remote {
        let token = ctx.resolve_token(token)?;
        if let Err(err) = ctx.link.authenticate(&token).await {
            println!("authentication failed: {err}");
        }
    }

    match ctx.jobs.run_job(remote).await {
        Ok(register) => {
            println!("register: {register}");
            println!("weight:   {:.4}", derive_weight(&register));
        }
        Err(err) => println!("job failed: {err}"),
    }

    super::print_log(&ctx.log);
    Ok(())
}
