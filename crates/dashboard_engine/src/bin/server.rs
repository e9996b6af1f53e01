use std::net::SocketAddr;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use dashboard_engine::api::{AppState, router};
use dashboard_engine::{DashboardOrchestrator, DashboardScheduler, logging};

const DEFAULT_ADDRESS: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

/// Parse `ADDRESS`, falling back to 127.0.0.1:3000 when unset or invalid.
fn listen_address_from(raw: Option<String>) -> SocketAddr {
    raw.and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(|| SocketAddr::from(DEFAULT_ADDRESS))
}


#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let log_env = logging::init_tracing();
    tracing::info!(%log_env, "dashboard_server: log filter");

    let metrics = PrometheusBuilder::new().install_recorder()?;

    let orchestrator = Arc::new(DashboardOrchestrator::from_env()?);
    let scheduler = Arc::new(DashboardScheduler::new(orchestrator));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.run(shutdown_rx).await })
    };

    let state = Arc::new(AppState::new(Arc::clone(&scheduler), Some(metrics)));
    let app = router(state);

    let addr = listen_address_from(std::env::var("ADDRESS").ok());
    info!(
        %addr,
        refresh_secs = scheduler.interval().as_secs(),
        "starting HTTP server"
    );

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("failed to listen for ctrl+c: {e}");
            }
        })
        .await;

    let _ = shutdown_tx.send(true);
    refresher.await?;

    if let Err(e) = served {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
    Ok(())
}
