use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use eventstored::modules::configuration_sources::standalone;
use eventstored::modules::control_plane::catalog::ConfigurationCatalog;
use eventstored::modules::control_plane::discovery::StaticEndpoints;
use eventstored::modules::control_plane::publisher::ConfigurationPublisher;
use eventstored::shell::bootstrap::sidecar_state;
use eventstored::shell::http::{control_plane_router, router};
use eventstored::shell::settings::{Cli, Command, ControlPlaneArgs, SidecarArgs};
use eventstored::shell::state::ControlPlaneState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match Cli::parse().command {
        Command::Sidecar(args) => run_sidecar(args).await,
        Command::ControlPlane(args) => run_control_plane(args).await,
    }
}

async fn run_sidecar(args: SidecarArgs) -> anyhow::Result<()> {
    let state = sidecar_state(&args).await?;
    serve(args.port, router(state)).await
}

async fn run_control_plane(args: ControlPlaneArgs) -> anyhow::Result<()> {
    let configurations = match &args.config {
        Some(path) => standalone::load(path)
            .await
            .context("loading control plane catalog")?,
        None => Vec::new(),
    };

    let state = ControlPlaneState {
        catalog: Arc::new(ConfigurationCatalog::new(configurations)),
        discovery: Arc::new(StaticEndpoints::parse(&args.sidecars)),
        publisher: Arc::new(ConfigurationPublisher::new(
            args.max_concurrent_pushes,
            Duration::from_millis(args.push_timeout_ms),
        )?),
    };

    serve(args.port, control_plane_router(state)).await
}

async fn serve(port: u16, app: axum::Router) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("HTTP endpoint: http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "can't listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "can't listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
