//! The assembled dashboard model and its section state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dashboard_client::Source;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::derive::{DerivedMetrics, NormalizedSources, derive_metrics, normalize_sources};

/// One dashboard section: either data, or an explicit "no data" state when
/// its source was unavailable. Never a zero standing in for missing data.
#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Ready(T),
    NoData,
}

impl<T> Section<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Section::Ready(v),
            None => Section::NoData,
        }
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Section::Ready(v) => Some(v),
            Section::NoData => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Section::Ready(_))
    }

    pub fn map<U>(&self, f: impl FnOnce(&T) -> U) -> Section<U> {
        match self {
            Section::Ready(v) => Section::Ready(f(v)),
            Section::NoData => Section::NoData,
        }
    }
}

/// Settled upstream documents for one load, keyed by source. A source that
/// failed, or answered with an error envelope, is simply absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourcePayloads(BTreeMap<Source, Value>);

impl SourcePayloads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: Source, payload: Value) {
        self.0.insert(source, payload);
    }

    pub fn with(mut self, source: Source, payload: Value) -> Self {
        self.insert(source, payload);
        self
    }

    pub fn get(&self, source: Source) -> Option<&Value> {
        self.0.get(&source)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardModel {
    /// Load sequence number; later loads have larger generations.
    pub generation: u64,
    #[schemars(with = "String")]
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub sources: NormalizedSources,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
    pub unavailable_sources: Vec<Source>,
}

/// Build a complete model from whatever sources settled. Pure: the same
/// payloads, instant and generation always give the same model.
pub fn assemble(
    payloads: &SourcePayloads,
    now: DateTime<Utc>,
    generation: u64,
    config: &EngineConfig,
) -> DashboardModel {
    let sources = normalize_sources(payloads, now, config);
    let metrics = derive_metrics(&sources, now, config);
    let unavailable_sources = sources.unavailable();
    DashboardModel {
        generation,
        generated_at: now,
        sources,
        metrics,
        unavailable_sources,
    }
}
