use tracing_subscriber::EnvFilter;

pub const LOG_LEVEL_VAR: &str = "DASHBOARD_LOG_LEVEL";

/// Filter directive from `DASHBOARD_LOG_LEVEL`, falling back to `RUST_LOG`,
/// default `info`.
pub fn log_filter_with<F>(mut get: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    get(LOG_LEVEL_VAR)
        .or_else(|| get("RUST_LOG"))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

/// Install the global compact subscriber. Output goes to stderr so stdout
/// stays clean for the snapshot binary. Returns the directive in effect.
pub fn init_tracing() -> String {
    let log_env = log_filter_with(|k| std::env::var(k).ok());
    let env_filter = EnvFilter::try_new(&log_env).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    log_env
}
