//! Contact-relationship metrics, high-risk relationship ranking and the
//! partner-momentum feed.
//!
//! Both rankings are ordered strategy chains: each strategy either produces a
//! result or declines with `None`, and the first result wins. The chains are
//! listed in `HighRiskStrategy::CHAIN` and `MomentumStrategy::CHAIN`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use super::newest_first;
use crate::resolver::{first_present, resolve_count, resolve_date, resolve_number, resolve_text};

pub const UNKNOWN_CONTACT: &str = "Unknown contact";

const TOTAL_CONTACT_FIELDS: &[&str] = &["total_contacts", "totalContacts", "contacts.total"];
const AWAITING_FOLLOW_UP_FIELDS: &[&str] = &[
    "supportersAwaitingFollowUp",
    "awaiting_follow_up",
    "overdue_followups",
    "needsFollowUp",
];
const AVERAGE_ENGAGEMENT_FIELDS: &[&str] = &["avg_engagement_score", "averageEngagement"];
const CRITICAL_CONTACT_FIELDS: &[&str] = &["critical_contacts", "criticalContacts", "at_risk_contacts"];
const TOP_COMPANY_FIELDS: &[&str] = &["top_companies", "topCompanies"];
const PARTNER_ACTIVITY_FIELDS: &[&str] = &[
    "partner_momentum",
    "partnerMomentum",
    "recent_interactions",
    "recentInteractions",
];

const PERSON_NAME_FIELDS: &[&str] = &["name", "full_name", "fullName", "contact_name"];
const ORGANIZATION_FIELDS: &[&str] = &["organization", "organisation", "company", "company_name"];
const COMPANY_NAME_FIELDS: &[&str] = &["company", "name", "company_name", "organization"];
const ENGAGEMENT_FIELDS: &[&str] = &["avg_engagement_score", "engagement_score", "engagementScore"];
const CONTACT_COUNT_FIELDS: &[&str] = &["contact_count", "contactCount", "contacts"];
const REASON_FIELDS: &[&str] = &["reason", "risk_reason", "note"];
const LAST_CONTACT_FIELDS: &[&str] = &["last_contact", "lastContact", "last_interaction"];
const ACTIVITY_FIELDS: &[&str] = &["activity", "summary", "type", "note"];
const OCCURRED_AT_FIELDS: &[&str] = &["date", "occurred_at", "occurredAt", "last_interaction"];

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriticalContact {
    pub name: String,
    pub organization: Option<String>,
    pub reason: Option<String>,
    pub engagement_score: Option<f64>,
    #[schemars(with = "Option<String>")]
    pub last_contact: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyEngagement {
    pub name: String,
    pub avg_engagement_score: Option<f64>,
    pub contact_count: Option<u64>,
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerActivity {
    pub name: String,
    pub organization: Option<String>,
    pub activity: Option<String>,
    #[schemars(with = "Option<String>")]
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Normalized contact-relationship source. List fields are `None` when the
/// upstream document does not carry them at all.
#[derive(Clone, Debug, Default, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactMetrics {
    pub total_contacts: Option<u64>,
    pub awaiting_follow_up: Option<u64>,
    pub average_engagement: Option<f64>,
    pub critical_contacts: Option<Vec<CriticalContact>>,
    pub top_companies: Option<Vec<CompanyEngagement>>,
    pub partner_activity: Option<Vec<PartnerActivity>>,
}

pub fn normalize_contact_metrics(raw: &Value) -> ContactMetrics {
    ContactMetrics {
        total_contacts: resolve_count(raw, TOTAL_CONTACT_FIELDS),
        awaiting_follow_up: resolve_count(raw, AWAITING_FOLLOW_UP_FIELDS),
        average_engagement: resolve_number(raw, AVERAGE_ENGAGEMENT_FIELDS),
        critical_contacts: records(raw, CRITICAL_CONTACT_FIELDS).map(|items| {
            items
                .iter()
                .map(|c| CriticalContact {
                    name: resolve_text(c, PERSON_NAME_FIELDS)
                        .unwrap_or_else(|| UNKNOWN_CONTACT.to_string()),
                    organization: resolve_text(c, ORGANIZATION_FIELDS),
                    reason: resolve_text(c, REASON_FIELDS),
                    engagement_score: resolve_number(c, ENGAGEMENT_FIELDS),
                    last_contact: resolve_date(c, LAST_CONTACT_FIELDS),
                })
                .collect()
        }),
        top_companies: records(raw, TOP_COMPANY_FIELDS).map(|items| {
            items
                .iter()
                .filter_map(|c| {
                    Some(CompanyEngagement {
                        name: resolve_text(c, COMPANY_NAME_FIELDS)?,
                        avg_engagement_score: resolve_number(c, ENGAGEMENT_FIELDS),
                        contact_count: resolve_count(c, CONTACT_COUNT_FIELDS),
                    })
                })
                .collect()
        }),
        partner_activity: records(raw, PARTNER_ACTIVITY_FIELDS).map(|items| {
            items
                .iter()
                .filter_map(|a| {
                    let organization = resolve_text(a, ORGANIZATION_FIELDS);
                    let name = resolve_text(a, PERSON_NAME_FIELDS).or_else(|| organization.clone())?;
                    Some(PartnerActivity {
                        name,
                        organization,
                        activity: resolve_text(a, ACTIVITY_FIELDS),
                        occurred_at: resolve_date(a, OCCURRED_AT_FIELDS),
                    })
                })
                .collect()
        }),
    }
}

fn records<'a>(raw: &'a Value, candidates: &[&str]) -> Option<&'a [Value]> {
    first_present(raw, candidates)
        .and_then(|v| v.as_array())
        .map(Vec::as_slice)
}

/// Tunables for relationship rankings. The engagement threshold and list size
/// have no documented business rationale and are configuration, not invariants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelationshipPolicy {
    pub engagement_threshold: f64,
    pub high_risk_limit: usize,
    pub momentum_limit: usize,
}

impl Default for RelationshipPolicy {
    fn default() -> Self {
        Self {
            engagement_threshold: 0.4,
            high_risk_limit: 4,
            momentum_limit: 5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HighRiskStrategy {
    CriticalContacts,
    LowEngagementCompanies,
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HighRiskRelationship {
    pub name: String,
    pub organization: Option<String>,
    pub engagement_score: Option<f64>,
    pub reason: Option<String>,
    pub basis: HighRiskStrategy,
}

impl HighRiskStrategy {
    pub const CHAIN: [HighRiskStrategy; 2] = [
        HighRiskStrategy::CriticalContacts,
        HighRiskStrategy::LowEngagementCompanies,
    ];

    pub fn apply(
        self,
        metrics: &ContactMetrics,
        policy: &RelationshipPolicy,
    ) -> Option<Vec<HighRiskRelationship>> {
        match self {
            HighRiskStrategy::CriticalContacts => {
                let contacts = metrics.critical_contacts.as_ref().filter(|c| !c.is_empty())?;
                Some(
                    contacts
                        .iter()
                        .take(policy.high_risk_limit)
                        .map(|c| HighRiskRelationship {
                            name: c.name.clone(),
                            organization: c.organization.clone(),
                            engagement_score: c.engagement_score,
                            reason: c.reason.clone(),
                            basis: self,
                        })
                        .collect(),
                )
            }
            HighRiskStrategy::LowEngagementCompanies => {
                let companies = metrics.top_companies.as_ref()?;
                Some(
                    companies
                        .iter()
                        .filter(|c| {
                            c.avg_engagement_score
                                .is_some_and(|s| s < policy.engagement_threshold)
                        })
                        .take(policy.high_risk_limit)
                        .map(|c| HighRiskRelationship {
                            name: c.name.clone(),
                            organization: None,
                            engagement_score: c.avg_engagement_score,
                            reason: Some("Low engagement".into()),
                            basis: self,
                        })
                        .collect(),
                )
            }
        }
    }
}

/// First strategy in the chain that yields a result; empty when none do.
pub fn high_risk_relationships(
    metrics: &ContactMetrics,
    policy: &RelationshipPolicy,
) -> Vec<HighRiskRelationship> {
    HighRiskStrategy::CHAIN
        .iter()
        .find_map(|s| s.apply(metrics, policy))
        .unwrap_or_default()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MomentumStrategy {
    PartnerActivity,
    EngagementRanking,
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerMomentum {
    pub name: String,
    pub organization: Option<String>,
    pub detail: Option<String>,
    #[schemars(with = "Option<String>")]
    pub occurred_at: Option<DateTime<Utc>>,
    pub engagement_score: Option<f64>,
    pub basis: MomentumStrategy,
}

impl MomentumStrategy {
    pub const CHAIN: [MomentumStrategy; 2] = [
        MomentumStrategy::PartnerActivity,
        MomentumStrategy::EngagementRanking,
    ];

    pub fn apply(
        self,
        metrics: &ContactMetrics,
        policy: &RelationshipPolicy,
    ) -> Option<Vec<PartnerMomentum>> {
        match self {
            MomentumStrategy::PartnerActivity => {
                let activity = metrics.partner_activity.as_ref().filter(|a| !a.is_empty())?;
                let mut ordered: Vec<&PartnerActivity> = activity.iter().collect();
                ordered.sort_by(|a, b| newest_first(a.occurred_at, b.occurred_at));
                Some(
                    ordered
                        .into_iter()
                        .take(policy.momentum_limit)
                        .map(|a| PartnerMomentum {
                            name: a.name.clone(),
                            organization: a.organization.clone(),
                            detail: a.activity.clone(),
                            occurred_at: a.occurred_at,
                            engagement_score: None,
                            basis: self,
                        })
                        .collect(),
                )
            }
            MomentumStrategy::EngagementRanking => {
                let companies = metrics.top_companies.as_ref()?;
                let mut scored: Vec<(&CompanyEngagement, f64)> = companies
                    .iter()
                    .filter_map(|c| c.avg_engagement_score.map(|s| (c, s)))
                    .collect();
                scored.sort_by(|a, b| b.1.total_cmp(&a.1));
                Some(
                    scored
                        .into_iter()
                        .take(policy.momentum_limit)
                        .map(|(c, score)| PartnerMomentum {
                            name: c.name.clone(),
                            organization: None,
                            detail: c.contact_count.map(|n| format!("{n} contacts engaged")),
                            occurred_at: None,
                            engagement_score: Some(score),
                            basis: self,
                        })
                        .collect(),
                )
            }
        }
    }
}

pub fn partner_momentum(metrics: &ContactMetrics, policy: &RelationshipPolicy) -> Vec<PartnerMomentum> {
    MomentumStrategy::CHAIN
        .iter()
        .find_map(|s| s.apply(metrics, policy))
        .unwrap_or_default()
}
