//! contentsync mock remote
//!
//! Serves the content endpoint the sync client mirrors to, persisting every
//! page as a JSON file under the data directory.
//!
//! Usage:
//!   contentsync-server --port 3001 --data-dir ./data

use std::{path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use contentsync_server::{build_router, ContentDir};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "contentsync-server")]
#[command(about = "Mock remote content endpoint for contentsync")]
struct Args {
    /// HTTP port to listen on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Directory holding the stored pages
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    tokio::fs::create_dir_all(&args.data_dir)
        .await
        .with_context(|| format!("Failed to create data directory {:?}", args.data_dir))?;
    info!("Serving content from {:?}", args.data_dir);

    let app = build_router(Arc::new(ContentDir::new(&args.data_dir)));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port))
        .await
        .with_context(|| format!("Failed to bind HTTP port {}", args.port))?;
    info!("Content endpoint listening on port {}", args.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("HTTP server failed")?;
    Ok(())
}
