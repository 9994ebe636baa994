mod config;
mod error;
mod routes;
mod service;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rsi_chart_providers::yahoo::YahooProvider;
use tracing::{info, warn};

use config::Cli;
use service::ChartService;

fn create_provider(cli: &Cli) -> Result<YahooProvider> {
    let provider = match &cli.yahoo_url {
        Some(url) => YahooProvider::with_base_url(url.clone()),
        None => YahooProvider::new(),
    };
    provider.context("failed to create Yahoo provider")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    let settings = cli.settings()?;
    let provider = create_provider(&cli)?;
    info!("Using provider: yahoo ({})", provider.base_url());

    let service = Arc::new(ChartService::new(Arc::new(provider), settings));
    info!(
        "Default RSI period {}, stocks: {}",
        service.settings().rsi_period,
        service.settings().stocks.join(", ")
    );
    let app = routes::router(Arc::clone(&service));

    let addr: SocketAddr = cli
        .address()
        .parse()
        .with_context(|| format!("invalid bind address {}", cli.address()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Serving charts from {} on http://{addr}", service.provider_name());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
