//! Shared test utilities: a scripted `UpstreamClient` for orchestrator and
//! scheduler unit tests.
#![cfg(test)]

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use dashboard_client::{DashboardError, Source, UpstreamClient};
use serde_json::Value;
use tokio::sync::Mutex;

#[derive(Clone)]
enum Reply {
    Body(Value),
    Fail(u16),
}

/// Answers each source from a script. Unscripted sources answer 404.
#[derive(Default)]
pub struct MockUpstreamClient {
    replies: HashMap<Source, Reply>,
    slow_calls: Option<(usize, Duration)>,
    requested: Mutex<Vec<Source>>,
}

impl MockUpstreamClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: Source, body: Value) -> Self {
        self.replies.insert(source, Reply::Body(body));
        self
    }

    pub fn failing(mut self, source: Source) -> Self {
        self.replies.insert(source, Reply::Fail(503));
        self
    }

    /// Delay the first `calls` requests, to hold an early load in flight
    /// while later ones complete.
    pub fn slow_for(mut self, calls: usize, delay: Duration) -> Self {
        self.slow_calls = Some((calls, delay));
        self
    }

    pub async fn requested(&self) -> Vec<Source> {
        self.requested.lock().await.clone()
    }
}

#[async_trait]
impl UpstreamClient for MockUpstreamClient {
    async fn fetch_source(&self, source: Source) -> Result<Value, DashboardError> {
        let call = {
            let mut requested = self.requested.lock().await;
            requested.push(source);
            requested.len()
        };
        if let Some((_, delay)) = self.slow_calls.filter(|(calls, _)| call <= *calls) {
            tokio::time::sleep(delay).await;
        }
        match self.replies.get(&source) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::Fail(status)) => Err(DashboardError::Status {
                status: *status,
                body: "unavailable".into(),
            }),
            None => Err(DashboardError::NotFound(source.path().to_string())),
        }
    }
}
