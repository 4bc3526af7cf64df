use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use qlens_core::access::AccessGate;
use qlens_core::artifact::OverlayMode;
use qlens_core::event_log::LogCategory;
use qlens_core::register::{BitRegister, derive_weight};

mod app;
mod commands;

use app::AppContext;

#[derive(Parser)]
#[command(name = "qlens")]
#[command(about = "QLENS - Quantum Lens Camera System", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate against the compute backend
    Auth {
        /// API token; falls back to secret.json
        #[arg(long)]
        token: Option<String>,
    },
    /// Run a job and print the resulting bit register
    Job {
        /// Request remote execution over the link
        #[arg(long)]
        remote: bool,
        /// API token for remote execution; falls back to secret.json
        #[arg(long)]
        token: Option<String>,
    },
    /// Capture an artifact from an encoded frame file
    Capture {
        /// Path to the frame image
        #[arg(long)]
        frame: PathBuf,
        /// Overlay mode the frame was rendered in; falls back to config
        #[arg(long)]
        mode: Option<OverlayMode>,
        /// Run the preceding job remotely
        #[arg(long)]
        remote: bool,
        /// API token for remote execution; falls back to secret.json
        #[arg(long)]
        token: Option<String>,
    },
    /// List captured artifacts
    Gallery,
    /// Describe a frame via the analysis service
    Analyze {
        /// Path to the frame image
        #[arg(long)]
        frame: PathBuf,
        /// Overlay mode to name in the prompt; falls back to config
        #[arg(long)]
        mode: Option<OverlayMode>,
    },
    /// Derive the weight of a bit register string
    Weight {
        /// Register as a 10-digit bit string, e.g. 1010010011
        bits: String,
    },
    /// Check a PIN against the access gate
    Access {
        /// Candidate 4-digit PIN
        pin: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Auth { token } => {
            let ctx = AppContext::init()?;
            commands::auth::run(&ctx, token).await?;
        }
        Commands::Job { remote, token } => {
            let ctx = AppContext::init()?;
            commands::job::run(&ctx, remote, token).await?;
        }
        Commands::Capture {
            frame,
            mode,
            remote,
            token,
        } => {
            let ctx = AppContext::init()?;
            let mode = mode.unwrap_or(ctx.config.default_mode);
            commands::capture::run(&ctx, &frame, mode, remote, token).await?;
        }
        Commands::Gallery => commands::gallery::run().await?,
        Commands::Analyze { frame, mode } => {
            let ctx = AppContext::init()?;
            let mode = mode.unwrap_or(ctx.config.default_mode);
            commands::analyze::run(&ctx, &frame, mode).await?;
        }
        Commands::Weight { bits } => {
            let register: BitRegister = bits.parse()?;
            println!("{:.4}", derive_weight(&register));
        }
        Commands::Access { pin } => {
            let ctx = AppContext::init()?;
            let gate = AccessGate::new(ctx.config.access_pin())?;
            if gate.verify(&pin) {
                ctx.log
                    .record(LogCategory::Access, "Access granted", None);
                println!("access granted");
            } else {
                ctx.log
                    .record(LogCategory::Access, "Access denied", None);
                println!("access denied");
            }
        }
    }

    Ok(())
}
