use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api_rate_gate::build_router;
use api_rate_gate::config::Args;
use api_rate_gate::rate_limit::RateLimiter;
use api_rate_gate::state::AppState;
use api_rate_gate::sweeper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // parse cli arguments
    let args = Args::parse();
    let config = args.gate_config()?;

    info!("Starting api-rate-gate {}", env!("CARGO_PKG_VERSION"));
    info!(
        prefix = %config.prefix,
        max_requests = config.max_requests,
        window_ms = config.window.as_millis() as u64,
        trust_forwarded_for = config.trust_forwarded_for,
        "Rate limit configured"
    );

    let state = Arc::new(AppState::new(RateLimiter::new(config)));

    match args.sweep_interval() {
        Some(every) => {
            tokio::spawn(sweeper::run(Arc::clone(&state), every));
        }
        None => info!("Window sweeper disabled, client table is unbounded"),
    }

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Gateway running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("api-rate-gate stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
