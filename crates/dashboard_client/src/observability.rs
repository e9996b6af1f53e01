//! Fetch-level metrics recorded through the `metrics` facade.
//!
//! Nothing is exported unless the host binary installs a recorder.

use std::time::Duration;

use crate::Source;

pub const FETCH_TOTAL: &str = "dashboard_upstream_fetch_total";
pub const FETCH_SECONDS: &str = "dashboard_upstream_fetch_seconds";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Success,
    ApplicationError,
    Failure,
}

impl FetchOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchOutcome::Success => "success",
            FetchOutcome::ApplicationError => "application_error",
            FetchOutcome::Failure => "failure",
        }
    }
}

pub fn record_fetch(source: Source, outcome: FetchOutcome, elapsed: Duration) {
    metrics::counter!(FETCH_TOTAL, "source" => source.as_str(), "outcome" => outcome.as_str())
        .increment(1);
    metrics::histogram!(FETCH_SECONDS, "source" => source.as_str()).record(elapsed.as_secs_f64());
}
