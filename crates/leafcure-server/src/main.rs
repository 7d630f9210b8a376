//! Leafcure server - plant disease treatment recommendations over HTTP.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use leafcure_server::config::DEFAULT_CONFIG_FILE;
use leafcure_server::{build_service, routes, AppState, Config};

#[derive(Parser, Debug)]
#[command(name = "leafcure-server")]
#[command(author, version, about = "Plant disease treatment recommendation server", long_about = None)]
struct Cli {
    /// Path to configuration file (defaults apply when leafcure.toml is absent)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Product catalog CSV
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(PathBuf::from(DEFAULT_CONFIG_FILE).as_path())?,
    };

    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(catalog) = &cli.catalog {
        config.catalog.path = catalog.clone();
    }
    Ok(config)
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let (service, report) = build_service(&config).await?;
    info!(
        records = report.records,
        skipped = report.skipped,
        duplicates = report.duplicates_replaced,
        oracle = ?config.oracle.backend,
        "Service ready"
    );

    let app = routes::create_router(AppState::new(service));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
