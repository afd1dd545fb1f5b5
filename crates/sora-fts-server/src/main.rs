//! Sora FTS Server - HTTP front-end for the Japanese full-text search demo.
//!
//! Serves a single search page plus a small JSON API. The tokenizer and the
//! index are built in the background after the listener is up, so the page
//! can show readiness while they load.

mod handler;
mod server;

use anyhow::Result;
use clap::Parser;
use sora_fts::config::{AppInfo, ServerDefaults};
use sora_fts::{AppConfig, SearchApp};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "sora-fts-server")]
#[command(about = "Japanese full-text search demo server")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value_t = ServerDefaults::PORT)]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = ServerDefaults::HOST)]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// JSON file with configuration overrides (tokenizer, store, corpus)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Query searched as soon as the index is ready
    #[arg(long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting {}", AppInfo::APP_NAME);

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            AppConfig::from_file(path)?
        }
        None => AppConfig::default(),
    };
    if let Some(query) = args.query {
        config.initial_query = query;
    }

    let app = SearchApp::new(config)?;

    // Listen first so readiness can be polled while stages load
    let addr = server::start_server(app.clone(), &args.host, args.port).await?;
    app.start();

    // Intentional stdout for process supervisors and tests
    println!("{}{}", ServerDefaults::PORT_ANNOUNCE_PREFIX, addr.port());

    info!("Search server running on http://{}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
