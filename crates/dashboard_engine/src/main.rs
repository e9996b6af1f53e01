use std::io::Write;

use dashboard_engine::{DashboardOrchestrator, logging};

/// Run a single dashboard load and print the model as JSON on stdout.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_env = logging::init_tracing();
    tracing::info!(%log_env, "dashboard_snapshot: log filter");

    let orchestrator = DashboardOrchestrator::from_env()?;
    let model = orchestrator.load().await;

    if !model.unavailable_sources.is_empty() {
        tracing::warn!(
            unavailable = ?model.unavailable_sources,
            "dashboard_snapshot: some sources had no data"
        );
    }

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &model)?;
    writeln!(stdout)?;
    Ok(())
}
