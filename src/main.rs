//! Huddle backend service.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                  HUDDLE BACKEND                  │
//!                        │                                                  │
//!   Client Request       │  ┌─────────┐   ┌──────────┐   ┌───────────────┐  │
//!   ─────────────────────┼─▶│  cors   │──▶│   http   │──▶│ huddles.rs /  │  │
//!                        │  │ req-id  │   │  server  │   │  tokens.rs    │  │
//!                        │  └─────────┘   └──────────┘   └───────┬───────┘  │
//!                        │                                       │          │
//!                        │                     ┌─────────────────┴───────┐  │
//!                        │                     ▼                         ▼  │
//!                        │             ┌───────────────┐       ┌──────────┐ │
//!                        │             │ HuddleRegistry│       │credential│ │
//!                        │             │  (RwLock)     │       │  issuer  │ │
//!                        │             └───────────────┘       └──────────┘ │
//!                        │                                                  │
//!                        │  config · observability · lifecycle              │
//!                        └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use huddle_backend::config::load_config;
use huddle_backend::lifecycle::{signals, startup, Shutdown};
use huddle_backend::observability::logging;

#[derive(Parser)]
#[command(name = "huddle-backend")]
#[command(about = "Token issuance and in-memory huddle tracking", long_about = None)]
struct Args {
    /// TOML configuration file. Without it, defaults plus environment are used.
    #[arg(short, long, env = "HUDDLE_CONFIG")]
    config: Option<PathBuf>,

    /// Validate configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    if args.check {
        println!("configuration ok");
        return Ok(());
    }

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "huddle-backend starting");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    startup::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
