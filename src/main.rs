//! Status API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id / trace / security headers / CORS
//!                          │
//!                          ▼
//!                    request_guard ── trusted host → rate limit → authorization
//!                          │                   (rejections: 400 / 429 / 401)
//!                          ▼
//!                      handlers ──────▶ StatusStore (memory:// or file://)
//!
//!     Background: LedgerSweeper (optional), Prometheus exporter (optional)
//!     Lifecycle:  Ctrl+C / SIGTERM → Shutdown broadcast → drain → exit
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use status_api::config::{load_config, AppConfig};
use status_api::lifecycle::{shutdown_signal, Shutdown};
use status_api::observability::{logging, metrics};
use status_api::store::open_store;
use status_api::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "status-api", version, about = "Rate-limited status check API")]
struct Args {
    /// Path to a TOML configuration file. Environment variables override it.
    #[arg(short, long, env = "STATUS_API_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("status-api: configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        database = %config.database.url,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "status-api starting"
    );

    if config.observability.metrics_enabled {
        let addr: std::net::SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let store = open_store(&config.database).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });

    HttpServer::new(config, store).run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
