//! Executive pulse: the five headline figures at the top of the dashboard.
//!
//! Every entry is always present. When the source behind an entry is
//! unavailable the value is the `CONNECT_DATA_SOURCE` placeholder; when the
//! source is there but the figure cannot be computed it is `NOT_COMPUTABLE`.
//! Neither case is ever rendered as a zero.

use schemars::JsonSchema;
use serde::Serialize;

use super::finance::RevenueSummary;
use super::projects::{EnrichedProject, group_by_risk, next_milestone};
use super::relationships::ContactMetrics;

pub const CONNECT_DATA_SOURCE: &str = "Connect data source";
pub const NOT_COMPUTABLE: &str = "–";
pub const NO_UPCOMING_MILESTONES: &str = "No upcoming milestones";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PulseKey {
    AnnualRecurringRevenue,
    CashRunway,
    ActiveProjects,
    SupportersAwaitingFollowUp,
    NextMilestone,
}

impl PulseKey {
    pub fn label(self) -> &'static str {
        match self {
            PulseKey::AnnualRecurringRevenue => "Annual recurring revenue",
            PulseKey::CashRunway => "Cash runway",
            PulseKey::ActiveProjects => "Active projects",
            PulseKey::SupportersAwaitingFollowUp => "Supporters awaiting follow-up",
            PulseKey::NextMilestone => "Next milestone",
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PulseValue {
    Currency(f64),
    Months(f64),
    Percent(i64),
    Count(u64),
    Milestone { project: String, days: i64 },
    Placeholder(String),
}

impl PulseValue {
    fn placeholder(text: &str) -> Self {
        PulseValue::Placeholder(text.to_string())
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, PulseValue::Placeholder(_))
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PulseEntry {
    pub key: PulseKey,
    pub label: String,
    pub value: PulseValue,
    pub detail: Option<String>,
}

impl PulseEntry {
    fn new(key: PulseKey, value: PulseValue, detail: Option<String>) -> Self {
        Self {
            key,
            label: key.label().to_string(),
            value,
            detail,
        }
    }
}

/// Normalized inputs the pulse reads; `None` marks an unavailable source.
#[derive(Clone, Copy, Debug, Default)]
pub struct PulseInputs<'a> {
    pub revenue: Option<&'a RevenueSummary>,
    pub projects: Option<&'a [EnrichedProject]>,
    pub contacts: Option<&'a ContactMetrics>,
}

pub fn executive_pulse(inputs: PulseInputs<'_>, active_project_target: u32) -> Vec<PulseEntry> {
    vec![
        revenue_entry(inputs.revenue),
        runway_entry(inputs.revenue),
        active_projects_entry(inputs.projects, active_project_target),
        follow_up_entry(inputs.contacts),
        milestone_entry(inputs.projects),
    ]
}

fn revenue_entry(revenue: Option<&RevenueSummary>) -> PulseEntry {
    let value = revenue
        .and_then(|r| r.total_revenue)
        .map(PulseValue::Currency)
        .unwrap_or_else(|| PulseValue::placeholder(CONNECT_DATA_SOURCE));
    let detail = revenue
        .and_then(|r| r.overdue_invoices)
        .filter(|n| *n > 0)
        .map(|n| format!("{n} overdue invoices"));
    PulseEntry::new(PulseKey::AnnualRecurringRevenue, value, detail)
}

fn runway_entry(revenue: Option<&RevenueSummary>) -> PulseEntry {
    let Some(revenue) = revenue else {
        return PulseEntry::new(
            PulseKey::CashRunway,
            PulseValue::placeholder(CONNECT_DATA_SOURCE),
            None,
        );
    };
    let value = revenue
        .runway_months
        .map(PulseValue::Months)
        .unwrap_or_else(|| PulseValue::placeholder(NOT_COMPUTABLE));
    let detail = revenue.burn_rate.map(|b| format!("Burn {b:.0}/month"));
    PulseEntry::new(PulseKey::CashRunway, value, detail)
}

fn active_projects_entry(projects: Option<&[EnrichedProject]>, target: u32) -> PulseEntry {
    let Some(projects) = projects else {
        return PulseEntry::new(
            PulseKey::ActiveProjects,
            PulseValue::placeholder(CONNECT_DATA_SOURCE),
            None,
        );
    };
    let active = group_by_risk(projects).active.len();
    let value = active_percentage(active, target)
        .map(PulseValue::Percent)
        .unwrap_or_else(|| PulseValue::placeholder(NOT_COMPUTABLE));
    PulseEntry::new(
        PulseKey::ActiveProjects,
        value,
        Some(format!("{active} of {target} target")),
    )
}

/// `active / target × 100`, rounded. Absent for a zero target.
pub fn active_percentage(active: usize, target: u32) -> Option<i64> {
    (target > 0).then(|| (active as f64 / f64::from(target) * 100.0).round() as i64)
}

fn follow_up_entry(contacts: Option<&ContactMetrics>) -> PulseEntry {
    let value = match contacts {
        None => PulseValue::placeholder(CONNECT_DATA_SOURCE),
        Some(c) => c
            .awaiting_follow_up
            .map(PulseValue::Count)
            .unwrap_or_else(|| PulseValue::placeholder(NOT_COMPUTABLE)),
    };
    let detail = contacts
        .and_then(|c| c.total_contacts)
        .map(|n| format!("{n} contacts tracked"));
    PulseEntry::new(PulseKey::SupportersAwaitingFollowUp, value, detail)
}

fn milestone_entry(projects: Option<&[EnrichedProject]>) -> PulseEntry {
    let Some(projects) = projects else {
        return PulseEntry::new(
            PulseKey::NextMilestone,
            PulseValue::placeholder(CONNECT_DATA_SOURCE),
            None,
        );
    };
    match next_milestone(projects) {
        Some(project) => PulseEntry::new(
            PulseKey::NextMilestone,
            PulseValue::Milestone {
                project: project.name.clone(),
                days: project.milestone_days.unwrap_or_default(),
            },
            project.focus_area.clone(),
        ),
        None => PulseEntry::new(
            PulseKey::NextMilestone,
            PulseValue::placeholder(NO_UPCOMING_MILESTONES),
            None,
        ),
    }
}
