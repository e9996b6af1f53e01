//! Concurrent upstream fetch and model assembly for one dashboard load.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use dashboard_client::config::ClientConfig;
use dashboard_client::http_client::ReqwestUpstreamClient;
use dashboard_client::observability::{FetchOutcome, record_fetch};
use dashboard_client::{DashboardError, Source, UpstreamClient};
use futures_util::future::join_all;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::model::{DashboardModel, SourcePayloads, assemble};

pub const LOADS_TOTAL: &str = "dashboard_loads_total";
pub const LOAD_SECONDS: &str = "dashboard_load_seconds";
pub const UNAVAILABLE_SOURCES: &str = "dashboard_unavailable_sources";

/// Owns the upstream client and stamps every load with a generation.
pub struct DashboardOrchestrator {
    client: Arc<dyn UpstreamClient>,
    config: EngineConfig,
    generation: AtomicU64,
}

impl DashboardOrchestrator {
    pub fn new(client: Arc<dyn UpstreamClient>, config: EngineConfig) -> Self {
        Self {
            client,
            config,
            generation: AtomicU64::new(0),
        }
    }

    pub fn from_env() -> EngineResult<Self> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Build an orchestrator over the reqwest client, reading both the
    /// client and engine settings through `get`.
    pub fn from_env_with<F>(mut get: F) -> EngineResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let client_config = ClientConfig::from_env_with(&mut get)?;
        let config = EngineConfig::from_env_with(&mut get)?;
        let client = ReqwestUpstreamClient::new(&client_config)?;
        tracing::info!(
            base_url = %client_config.base_url,
            refresh_secs = config.refresh_interval.as_secs(),
            "upstream client configured"
        );
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generation of the most recently started load; 0 before the first.
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn load(&self) -> DashboardModel {
        self.load_at(Utc::now()).await
    }

    /// Fetch every source, wait for all of them to settle, then assemble.
    /// `now` is the instant all day counts are measured from.
    pub async fn load_at(&self, now: DateTime<Utc>) -> DashboardModel {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();

        let payloads = self.fetch_all().await;
        let model = assemble(&payloads, now, generation, &self.config);

        let elapsed = started.elapsed();
        metrics::counter!(LOADS_TOTAL).increment(1);
        metrics::histogram!(LOAD_SECONDS).record(elapsed.as_secs_f64());
        metrics::gauge!(UNAVAILABLE_SOURCES).set(model.unavailable_sources.len() as f64);
        tracing::info!(
            generation,
            settled = payloads.len(),
            unavailable = model.unavailable_sources.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "dashboard load complete"
        );
        model
    }

    /// Settle-all fetch: one failing source never cancels the others.
    pub async fn fetch_all(&self) -> SourcePayloads {
        let fetches = Source::ALL.into_iter().map(|source| {
            let client = Arc::clone(&self.client);
            async move {
                let started = Instant::now();
                let result = client.fetch_source(source).await;
                (source, result, started.elapsed())
            }
        });

        let mut payloads = SourcePayloads::new();
        for (source, result, elapsed) in join_all(fetches).await {
            let (outcome, payload) = unwrap_settled(source, result);
            record_fetch(source, outcome, elapsed);
            if let Some(payload) = payload {
                payloads.insert(source, payload);
            }
        }
        payloads
    }
}

/// Classify one settled fetch. Transport failures and error envelopes both
/// leave the source without data.
pub fn unwrap_settled(
    source: Source,
    result: Result<Value, DashboardError>,
) -> (FetchOutcome, Option<Value>) {
    match result {
        Ok(body) if is_error_envelope(&body) => {
            tracing::warn!(%source, "upstream answered with an error envelope");
            (FetchOutcome::ApplicationError, None)
        }
        Ok(body) => (FetchOutcome::Success, Some(body)),
        Err(e) => {
            tracing::warn!(%source, kind = e.kind(), error = %e, "upstream fetch failed");
            (FetchOutcome::Failure, None)
        }
    }
}

/// A successful response whose body reports an application-level error:
/// a non-empty `error` field or `success: false`.
pub fn is_error_envelope(body: &Value) -> bool {
    let Some(obj) = body.as_object() else {
        return false;
    };
    let has_error = match obj.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    };
    has_error || obj.get("success") == Some(&Value::Bool(false))
}
