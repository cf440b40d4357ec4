//! page-mounts server
//!
//! Hosts the pages and mounts declared in a TOML config file.
//!
//! ```text
//!     Client Request
//!     ─────────▶ http server ──▶ mount table ──▶ coding strategy ──▶ request target
//!                                                                        │
//!     Client Response                                                    ▼
//!     ◀───────── JSON page view / 302 to hybrid URL ◀── request cycle (page store)
//!
//!     config file ──▶ watcher ──▶ rebuilt mount table swapped in
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use page_mounts::config::{load_config, ConfigWatcher};
use page_mounts::http::HttpServer;
use page_mounts::lifecycle::{shutdown_on_signal, Shutdown};
use page_mounts::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "page-mounts")]
#[command(about = "Serve mounted pages with bookmarkable and hybrid URLs", long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "mounts.toml")]
    config: PathBuf,

    /// Do not reload the config when the file changes
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init_logging(&config.observability);
    tracing::info!(
        config = %args.config.display(),
        pages = config.pages.len(),
        mounts = config.mounts.len(),
        "page-mounts v0.1.0 starting"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let server = HttpServer::new(&config)?;

    // The watcher stops when its handle is dropped.
    let (_watcher, updates) = if args.no_watch {
        (None, None)
    } else {
        let (watcher, updates) = ConfigWatcher::new(&args.config);
        (Some(watcher.run()?), Some(updates))
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    server.run(listener, updates, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
