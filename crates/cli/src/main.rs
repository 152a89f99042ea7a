//! CI status entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** from flags and environment variables ([`config::Cli`]).
//! 2. **Wire observability**: configure `tracing-subscriber` with a text or
//!    JSON layer and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an
//!    OpenTelemetry OTLP exporter. All `tracing` spans and events emitted by
//!    every crate in the workspace flow through this layer.
//! 3. **Construct infrastructure**: build the provider adapters over one
//!    shared HTTP client and inject them into [`status::StatusService`].
//! 4. **Serve** the [`api::router`] until Ctrl-C.

mod config;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use providers::Providers;
use status::StatusService;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let telemetry = telemetry::init_tracing(cli.json, cli.otlp_endpoint.as_deref())?;

    let result = serve(&cli).await;
    if let Err(err) = &result {
        tracing::error!(error = %err, "server stopped");
    }

    telemetry.shutdown();
    result
}

async fn serve(cli: &Cli) -> anyhow::Result<()> {
    let providers = Providers::from_config(&cli.provider_config())
        .context("failed to build the provider HTTP client")?;
    let service = StatusService::new(
        providers.github.clone(),
        providers.travis,
        providers.jenkins,
        providers.github,
    )
    .with_pr_concurrency(cli.pr_concurrency);

    let app = api::router(Arc::new(service));

    let addr = cli.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr()?;
    info!(
        github = %cli.github_api_url,
        travis = %cli.travis_api_url,
        "Server is running on http://{local}"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
