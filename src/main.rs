//! Content gateway binary.
//!
//! Boot order: parse arguments, load and validate configuration, initialize
//! logging and metrics, provision upload storage, then serve until a signal
//! lands.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use content_gateway::config::loader;
use content_gateway::lifecycle::{signals, Shutdown};
use content_gateway::observability::{logging, metrics};
use content_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "content-gateway")]
#[command(about = "Content-site API gateway: request admission and image uploads", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => loader::default_config()?,
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability, config.mode);

    tracing::info!(
        mode = ?config.mode,
        bind_address = %config.listener.bind_address,
        upload_root = %config.uploads.root_dir,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_on_signal(&shutdown).await;
    });

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
