//! Project normalization, risk grouping and portfolio counters.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use crate::resolver::{resolve_date, resolve_number, resolve_records, resolve_text};

pub const UNTITLED_PROJECT: &str = "Untitled project";
pub const UNKNOWN_STATUS: &str = "Unknown";
pub const UNASSIGNED_OWNER: &str = "Unassigned";

const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub const LIST_FIELDS: &[&str] = &["projects", "data", "items"];
const ID_FIELDS: &[&str] = &["project_id", "id"];
const NAME_FIELDS: &[&str] = &["project_name", "name"];
const STATUS_FIELDS: &[&str] = &["status"];
const MILESTONE_FIELDS: &[&str] = &[
    "nextMilestoneDate",
    "next_milestone_date",
    "milestone_date",
    "due_date",
];
const FOCUS_AREA_FIELDS: &[&str] = &["focusArea", "focus_area", "area.name", "metadata.focusArea"];
const OWNER_FIELDS: &[&str] = &["owner", "lead", "projectLead.name"];
const FUNDING_GAP_FIELDS: &[&str] = &["fundingGap", "funding_gap", "fundingNeeded"];
const REVENUE_ACTUAL_FIELDS: &[&str] = &[
    "revenueActual",
    "revenue_actual",
    "actualIncoming",
    "actual_incoming",
];
const REVENUE_POTENTIAL_FIELDS: &[&str] = &[
    "revenuePotential",
    "revenue_potential",
    "potentialIncoming",
    "potential_incoming",
];

const AT_RISK_KEYWORDS: &[&str] = &["risk", "blocked", "paused"];
const SEEKING_SUPPORT_KEYWORDS: &[&str] = &["seeking", "support", "funding"];

/// Canonical, fully-resolved view of one upstream project record.
#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedProject {
    pub id: Option<String>,
    pub name: String,
    pub status: String,
    #[schemars(with = "Option<String>")]
    pub milestone_date: Option<DateTime<Utc>>,
    /// Whole days from the load instant to the milestone; negative when overdue.
    pub milestone_days: Option<i64>,
    pub funding_gap: Option<f64>,
    pub owner: String,
    pub focus_area: Option<String>,
    pub revenue_actual: Option<f64>,
    pub revenue_potential: Option<f64>,
}

impl EnrichedProject {
    pub fn is_unassigned(&self) -> bool {
        self.owner == UNASSIGNED_OWNER
    }

    pub fn is_overdue(&self) -> bool {
        self.milestone_days.is_some_and(|d| d < 0)
    }
}

/// Normalize one raw project record. Total: every field has a defined
/// fallback and a malformed field never drops the record.
pub fn normalize_project(raw: &Value, now: DateTime<Utc>) -> EnrichedProject {
    let milestone_date = resolve_date(raw, MILESTONE_FIELDS);
    EnrichedProject {
        id: resolve_text(raw, ID_FIELDS),
        name: resolve_text(raw, NAME_FIELDS).unwrap_or_else(|| UNTITLED_PROJECT.into()),
        status: resolve_text(raw, STATUS_FIELDS).unwrap_or_else(|| UNKNOWN_STATUS.into()),
        milestone_days: milestone_date.map(|d| days_until(d, now)),
        milestone_date,
        funding_gap: resolve_number(raw, FUNDING_GAP_FIELDS),
        owner: resolve_text(raw, OWNER_FIELDS).unwrap_or_else(|| UNASSIGNED_OWNER.into()),
        focus_area: resolve_text(raw, FOCUS_AREA_FIELDS),
        revenue_actual: resolve_number(raw, REVENUE_ACTUAL_FIELDS),
        revenue_potential: resolve_number(raw, REVENUE_POTENTIAL_FIELDS),
    }
}

/// Normalize a projects payload. `None` when the payload holds no record list.
pub fn normalize_projects(payload: &Value, now: DateTime<Utc>) -> Option<Vec<EnrichedProject>> {
    let records = resolve_records(payload, LIST_FIELDS)?;
    Some(records.iter().map(|r| normalize_project(r, now)).collect())
}

/// Calendar-day distance, rounding half toward positive infinity.
pub fn days_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (target - now).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY + 0.5).floor() as i64
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RiskGroup {
    Active,
    SeekingSupport,
    AtRisk,
}

/// Status keywords win over dates; an overdue milestone alone is enough for
/// `AtRisk`.
pub fn classify(project: &EnrichedProject) -> RiskGroup {
    let status = project.status.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|w| status.contains(w));
    if contains_any(AT_RISK_KEYWORDS) || project.is_overdue() {
        RiskGroup::AtRisk
    } else if contains_any(SEEKING_SUPPORT_KEYWORDS) {
        RiskGroup::SeekingSupport
    } else {
        RiskGroup::Active
    }
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRiskGroups {
    pub active: Vec<EnrichedProject>,
    pub seeking_support: Vec<EnrichedProject>,
    pub at_risk: Vec<EnrichedProject>,
}

impl ProjectRiskGroups {
    pub fn total(&self) -> usize {
        self.active.len() + self.seeking_support.len() + self.at_risk.len()
    }
}

/// Partition projects into exactly one group each, preserving input order.
pub fn group_by_risk(projects: &[EnrichedProject]) -> ProjectRiskGroups {
    let mut groups = ProjectRiskGroups::default();
    for project in projects {
        let bucket = match classify(project) {
            RiskGroup::Active => &mut groups.active,
            RiskGroup::SeekingSupport => &mut groups.seeking_support,
            RiskGroup::AtRisk => &mut groups.at_risk,
        };
        bucket.push(project.clone());
    }
    groups
}

#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioCounters {
    pub total: usize,
    pub missing_lead: usize,
    pub overdue_milestones: usize,
}

pub fn portfolio_counters(projects: &[EnrichedProject]) -> PortfolioCounters {
    PortfolioCounters {
        total: projects.len(),
        missing_lead: projects.iter().filter(|p| p.is_unassigned()).count(),
        overdue_milestones: projects.iter().filter(|p| p.is_overdue()).count(),
    }
}

/// Project with the smallest non-negative `milestone_days`; the earliest in
/// fetch order wins a tie.
pub fn next_milestone(projects: &[EnrichedProject]) -> Option<&EnrichedProject> {
    projects
        .iter()
        .filter_map(|p| p.milestone_days.filter(|d| *d >= 0).map(|d| (d, p)))
        .min_by_key(|(days, _)| *days)
        .map(|(_, p)| p)
}
