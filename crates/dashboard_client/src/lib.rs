//! `UpstreamClient` trait and the sources feeding the overview dashboard.
//!
//! Every upstream endpoint returns loosely-shaped JSON, so the trait hands
//! back raw `serde_json::Value` documents. Shape-guessing happens in the
//! engine crate, never here.

use std::fmt;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod observability;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Auth(String),
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::Http(_) => "http",
            DashboardError::NotFound(_) => "not_found",
            DashboardError::Auth(_) => "auth",
            DashboardError::Status { .. } => "status",
            DashboardError::Config(_) => "config",
        }
    }
}

/// The upstream documents consumed by the overview dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    FinancialSummary,
    Integrations,
    Projects,
    Calendar,
    Mailbox,
    Contacts,
    OutreachTasks,
    Intelligence,
    Stories,
}

impl Source {
    /// Every source, in the order the dashboard issues its fetches.
    pub const ALL: [Source; 9] = [
        Source::FinancialSummary,
        Source::Integrations,
        Source::Projects,
        Source::Calendar,
        Source::Mailbox,
        Source::Contacts,
        Source::OutreachTasks,
        Source::Intelligence,
        Source::Stories,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Source::FinancialSummary => "financial_summary",
            Source::Integrations => "integrations",
            Source::Projects => "projects",
            Source::Calendar => "calendar",
            Source::Mailbox => "mailbox",
            Source::Contacts => "contacts",
            Source::OutreachTasks => "outreach_tasks",
            Source::Intelligence => "intelligence",
            Source::Stories => "stories",
        }
    }

    /// Endpoint path relative to the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Source::FinancialSummary => "/api/financial/summary",
            Source::Integrations => "/api/integrations/health",
            Source::Projects => "/api/projects",
            Source::Calendar => "/api/calendar/highlights",
            Source::Mailbox => "/api/gmail/status",
            Source::Contacts => "/api/contacts/relationship-metrics",
            Source::OutreachTasks => "/api/outreach/tasks",
            Source::Intelligence => "/api/intelligence/insights",
            Source::Stories => "/api/stories/highlights",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait UpstreamClient: Send + Sync + 'static {
    /// Fetch the raw JSON document for one source.
    async fn fetch_source(&self, source: Source) -> Result<serde_json::Value, DashboardError>;
}
