use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use crate::resolver::{resolve_number, resolve_records, resolve_text};

pub const LIST_FIELDS: &[&str] = &["insights", "data", "items", "recommendations"];
pub const INSIGHT_LIMIT: usize = 6;

const TITLE_FIELDS: &[&str] = &["title", "headline", "name"];
const SUMMARY_FIELDS: &[&str] = &["summary", "description", "insight", "content"];
const PRIORITY_FIELDS: &[&str] = &["priority", "urgency", "severity"];
const CATEGORY_FIELDS: &[&str] = &["category", "type", "area"];
const CONFIDENCE_FIELDS: &[&str] = &["confidence", "confidence_score", "score"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    Urgent,
    High,
    Medium,
    Low,
}

impl InsightPriority {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "urgent" | "critical" => Some(InsightPriority::Urgent),
            "high" => Some(InsightPriority::High),
            "medium" | "normal" => Some(InsightPriority::Medium),
            "low" => Some(InsightPriority::Low),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiInsight {
    pub title: String,
    pub summary: Option<String>,
    pub priority: InsightPriority,
    pub category: Option<String>,
    pub confidence: Option<f64>,
}

/// Insights ordered most urgent first, keeping upstream order within a
/// priority. Records without a title or summary carry nothing to show and
/// are skipped.
pub fn normalize_insights(payload: &Value, limit: usize) -> Option<Vec<AiInsight>> {
    let records = resolve_records(payload, LIST_FIELDS)?;
    let mut insights: Vec<AiInsight> = records
        .iter()
        .filter_map(|raw| {
            let summary = resolve_text(raw, SUMMARY_FIELDS);
            let title = resolve_text(raw, TITLE_FIELDS).or_else(|| summary.clone())?;
            Some(AiInsight {
                title,
                summary,
                priority: resolve_text(raw, PRIORITY_FIELDS)
                    .and_then(|p| InsightPriority::parse(&p))
                    .unwrap_or(InsightPriority::Medium),
                category: resolve_text(raw, CATEGORY_FIELDS),
                confidence: resolve_number(raw, CONFIDENCE_FIELDS),
            })
        })
        .collect();
    insights.sort_by_key(|i| i.priority);
    insights.truncate(limit);
    Some(insights)
}
