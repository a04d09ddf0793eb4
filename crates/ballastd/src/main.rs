//! ballastd — the Ballast capacity controller.
//!
//! Wires the capacity provider, the reconciler, and the HTTP API into one
//! process:
//! - Capacity provider (sidecar HTTP client, or dry-run simulation)
//! - Reconciler (single instance, shared by handle)
//! - REST API + status page
//!
//! # Usage
//!
//! ```text
//! AUTOSCALER_TARGET_RESOURCE=worker AUTOSCALER_STEPS=2 ballastd --port 3000
//! ```

mod cli;

use std::net::SocketAddr;
use std::sync::Arc;

use ballast_provider::{CapacityProvider, DryRunProvider, SidecarClient};
use ballast_reconcile::{CancellationToken, Reconciler};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{normalize_level, Cli, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format)?;

    let config = cli.reconciler_config()?;

    // ── Capacity provider ──────────────────────────────────────

    let provider: Arc<dyn CapacityProvider> = if config.dry_run() {
        warn!("dry run enabled, capacity provider is simulated");
        Arc::new(DryRunProvider::default())
    } else {
        let client = SidecarClient::new(&cli.provider_url)?;
        info!(url = %client.base_url(), "capacity provider client initialized");
        Arc::new(client)
    };

    // ── Reconciler ─────────────────────────────────────────────

    info!(
        resource = %config.target_resource(),
        cooldown_secs = config.cooldown().as_secs(),
        step = config.step(),
        poll_interval_secs = config.poll_interval().as_secs(),
        poll_timeout_secs = config.poll_timeout().as_secs(),
        "reconciler initialized"
    );
    let reconciler = Arc::new(Reconciler::new(config, provider));

    // ── API server ─────────────────────────────────────────────

    let shutdown = CancellationToken::new();
    let router = ballast_api::build_router(reconciler, shutdown.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("shutdown signal received");
            // Aborts any in-flight convergence with a cancellation error.
            shutdown.cancel();
        })
        .await?;

    info!("ballast controller stopped");
    Ok(())
}

fn init_tracing(level: &str, format: LogFormat) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(normalize_level(level))?,
    };

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    Ok(())
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
