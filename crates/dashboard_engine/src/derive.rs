//! Per-source normalization and metric derivation for one dashboard load.
//!
//! Each source is normalized on its own and each metric reads only the
//! sections it depends on, so an unavailable source blanks out exactly the
//! metrics built from it and nothing else.

use chrono::{DateTime, Utc};
use dashboard_client::Source;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::domains::alerts::{OperationsAlert, operations_alerts};
use crate::domains::calendar::{CalendarHighlight, normalize_calendar};
use crate::domains::finance::{
    RevenuePipeline, RevenueSummary, normalize_financial_summary, revenue_pipeline,
};
use crate::domains::insights::{AiInsight, normalize_insights};
use crate::domains::integrations::{IntegrationSummary, parse_integrations};
use crate::domains::mailbox::{MailboxSnapshot, normalize_mailbox};
use crate::domains::outreach::{OutreachTask, TaskTally, normalize_tasks, tally_tasks};
use crate::domains::projects::{
    EnrichedProject, PortfolioCounters, ProjectRiskGroups, group_by_risk, normalize_projects,
    portfolio_counters,
};
use crate::domains::pulse::{PulseEntry, PulseInputs, executive_pulse};
use crate::domains::relationships::{
    ContactMetrics, HighRiskRelationship, PartnerMomentum, high_risk_relationships,
    normalize_contact_metrics, partner_momentum,
};
use crate::domains::stories::{StoryHighlight, normalize_stories};
use crate::model::{Section, SourcePayloads};

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSources {
    pub revenue: Section<RevenueSummary>,
    pub integrations: Section<IntegrationSummary>,
    pub projects: Section<Vec<EnrichedProject>>,
    pub calendar: Section<Vec<CalendarHighlight>>,
    pub mailbox: Section<MailboxSnapshot>,
    pub contacts: Section<ContactMetrics>,
    pub outreach_tasks: Section<Vec<OutreachTask>>,
    pub insights: Section<Vec<AiInsight>>,
    pub stories: Section<Vec<StoryHighlight>>,
}

impl NormalizedSources {
    /// Sources whose section ended up without data, in fetch order.
    pub fn unavailable(&self) -> Vec<Source> {
        Source::ALL
            .into_iter()
            .filter(|source| !self.is_ready(*source))
            .collect()
    }

    pub fn is_ready(&self, source: Source) -> bool {
        match source {
            Source::FinancialSummary => self.revenue.is_ready(),
            Source::Integrations => self.integrations.is_ready(),
            Source::Projects => self.projects.is_ready(),
            Source::Calendar => self.calendar.is_ready(),
            Source::Mailbox => self.mailbox.is_ready(),
            Source::Contacts => self.contacts.is_ready(),
            Source::OutreachTasks => self.outreach_tasks.is_ready(),
            Source::Intelligence => self.insights.is_ready(),
            Source::Stories => self.stories.is_ready(),
        }
    }
}

/// Object-shaped sources accept only a JSON object; anything else carries no
/// fields to resolve.
fn document(payloads: &SourcePayloads, source: Source) -> Option<&Value> {
    payloads.get(source).filter(|v| v.is_object())
}

pub fn normalize_sources(
    payloads: &SourcePayloads,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> NormalizedSources {
    NormalizedSources {
        revenue: Section::from_option(
            document(payloads, Source::FinancialSummary)
                .map(|raw| normalize_financial_summary(raw, config.trend_bounds)),
        ),
        integrations: Section::from_option(
            payloads.get(Source::Integrations).and_then(parse_integrations),
        ),
        projects: Section::from_option(
            payloads
                .get(Source::Projects)
                .and_then(|raw| normalize_projects(raw, now)),
        ),
        calendar: Section::from_option(
            payloads
                .get(Source::Calendar)
                .and_then(|raw| normalize_calendar(raw, now)),
        ),
        mailbox: Section::from_option(
            document(payloads, Source::Mailbox)
                .map(|raw| normalize_mailbox(raw, config.recent_email_limit)),
        ),
        contacts: Section::from_option(
            document(payloads, Source::Contacts).map(normalize_contact_metrics),
        ),
        outreach_tasks: Section::from_option(
            payloads.get(Source::OutreachTasks).and_then(normalize_tasks),
        ),
        insights: Section::from_option(
            payloads
                .get(Source::Intelligence)
                .and_then(|raw| normalize_insights(raw, config.insight_limit)),
        ),
        stories: Section::from_option(payloads.get(Source::Stories).and_then(normalize_stories)),
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub executive_pulse: Vec<PulseEntry>,
    pub project_risk: Section<ProjectRiskGroups>,
    pub portfolio: Section<PortfolioCounters>,
    pub outreach_tally: Section<TaskTally>,
    pub revenue_pipeline: Section<RevenuePipeline>,
    pub high_risk_relationships: Section<Vec<HighRiskRelationship>>,
    pub partner_momentum: Section<Vec<PartnerMomentum>>,
    pub operations_alerts: Vec<OperationsAlert>,
}

pub fn derive_metrics(
    sources: &NormalizedSources,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> DerivedMetrics {
    let projects = sources.projects.as_ref().map(Vec::as_slice);
    let contacts = sources.contacts.as_ref();
    let portfolio = sources.projects.map(|p| portfolio_counters(p));

    let executive_pulse = executive_pulse(
        PulseInputs {
            revenue: sources.revenue.as_ref(),
            projects,
            contacts,
        },
        config.active_project_target,
    );
    let operations_alerts = operations_alerts(
        sources.integrations.as_ref(),
        contacts.and_then(|c| c.awaiting_follow_up),
        portfolio.as_ref().map(|c| c.overdue_milestones),
    );

    DerivedMetrics {
        executive_pulse,
        project_risk: sources.projects.map(|p| group_by_risk(p)),
        portfolio,
        outreach_tally: sources.outreach_tasks.map(|t| tally_tasks(t, now)),
        revenue_pipeline: sources.projects.map(|p| revenue_pipeline(p)),
        high_risk_relationships: sources
            .contacts
            .map(|c| high_risk_relationships(c, &config.relationships)),
        partner_momentum: sources
            .contacts
            .map(|c| partner_momentum(c, &config.relationships)),
        operations_alerts,
    }
}
