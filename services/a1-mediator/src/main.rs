use std::path::PathBuf;

use a1_core::BUILD_INFO;
use a1_mediator::{build_router, config, AppState, MediatorConfig};
use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "a1-mediator")]
#[command(about = "A1 Mediator - policy types, instances and xApp lifecycle")]
#[command(version = a1_core::VERSION)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file
    #[arg(long)]
    listen: Option<String>,

    /// xApp manager base URL, overrides the config file
    #[arg(long)]
    xapp_api: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("Starting {}", BUILD_INFO);

    let mut cfg = match &args.config {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MediatorConfig::default(),
    };
    if let Some(listen) = args.listen {
        cfg.listen = listen;
    }
    if let Some(xapp_api) = args.xapp_api {
        cfg.xapp_api = xapp_api;
    }
    cfg.validate().context("invalid configuration")?;

    let state = AppState::from_config(&cfg).context("initializing mediator")?;
    let app = build_router(state);

    let listener = TcpListener::bind(cfg.listen_addr()?).await?;
    info!("A1 Mediator listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("A1 Mediator stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
