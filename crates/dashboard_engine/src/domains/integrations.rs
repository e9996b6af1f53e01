use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use crate::resolver::{lookup, resolve_flag, resolve_text};

const SERVICE_MAP_FIELDS: &[&str] = &["services", "integrations"];
const OVERALL_FIELDS: &[&str] = &["overall", "overallStatus", "overall_status"];
const NAME_FIELDS: &[&str] = &["name", "displayName", "label"];
const ID_FIELDS: &[&str] = &["id", "key", "service"];
const HEALTHY_FIELDS: &[&str] = &["healthy", "isHealthy", "ok"];
const CONFIGURED_FIELDS: &[&str] = &["configured", "isConfigured", "enabled"];
const STATUS_FIELDS: &[&str] = &["status", "state"];
const MESSAGE_FIELDS: &[&str] = &["message", "error", "detail", "statusMessage"];
const HEALTHY_STATUSES: &[&str] = &["healthy", "ok", "connected", "operational", "up"];

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationServiceStatus {
    pub id: String,
    pub name: String,
    pub healthy: bool,
    pub configured: bool,
    pub message: Option<String>,
}

impl IntegrationServiceStatus {
    pub fn needs_attention(&self) -> bool {
        !self.healthy || !self.configured
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverallHealth {
    Healthy,
    Degraded,
    Offline,
}

impl OverallHealth {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "healthy" => Some(OverallHealth::Healthy),
            "degraded" => Some(OverallHealth::Degraded),
            "offline" => Some(OverallHealth::Offline),
            _ => None,
        }
    }

    pub fn from_counts(healthy: usize, total: usize) -> Self {
        if total > 0 && healthy == total {
            OverallHealth::Healthy
        } else if healthy > 0 {
            OverallHealth::Degraded
        } else {
            OverallHealth::Offline
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSummary {
    pub overall: OverallHealth,
    pub healthy_count: usize,
    pub total_services: usize,
    pub services: Vec<IntegrationServiceStatus>,
}

impl IntegrationSummary {
    pub fn attention_needed(&self) -> impl Iterator<Item = &IntegrationServiceStatus> {
        self.services.iter().filter(|s| s.needs_attention())
    }
}

/// Parse a raw service-health payload. `None` means integration data is
/// unavailable, which is distinct from every service being down.
pub fn parse_integrations(raw: &Value) -> Option<IntegrationSummary> {
    let services: Vec<IntegrationServiceStatus> = SERVICE_MAP_FIELDS
        .iter()
        .filter_map(|key| lookup(raw, key))
        .find_map(|v| parse_service_collection(v).filter(|s| !s.is_empty()))?;

    let healthy_count = services.iter().filter(|s| s.healthy).count();
    let total_services = services.len();
    let overall = resolve_text(raw, OVERALL_FIELDS)
        .and_then(|s| OverallHealth::parse(&s))
        .unwrap_or_else(|| OverallHealth::from_counts(healthy_count, total_services));

    Some(IntegrationSummary {
        overall,
        healthy_count,
        total_services,
        services,
    })
}

fn parse_service_collection(value: &Value) -> Option<Vec<IntegrationServiceStatus>> {
    match value {
        Value::Object(map) => Some(
            map.iter()
                .map(|(key, entry)| parse_service(key, entry))
                .collect(),
        ),
        Value::Array(items) => Some(
            items
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let key = resolve_text(entry, ID_FIELDS)
                        .or_else(|| resolve_text(entry, NAME_FIELDS))
                        .unwrap_or_else(|| format!("service-{}", i + 1));
                    parse_service(&key, entry)
                })
                .collect(),
        ),
        _ => None,
    }
}

fn parse_service(key: &str, entry: &Value) -> IntegrationServiceStatus {
    match entry {
        Value::Object(_) => {
            let healthy = resolve_flag(entry, HEALTHY_FIELDS)
                .or_else(|| {
                    resolve_text(entry, STATUS_FIELDS)
                        .map(|s| HEALTHY_STATUSES.contains(&s.to_ascii_lowercase().as_str()))
                })
                .unwrap_or(false);
            IntegrationServiceStatus {
                id: key.to_string(),
                name: resolve_text(entry, NAME_FIELDS).unwrap_or_else(|| key.to_string()),
                healthy,
                configured: resolve_flag(entry, CONFIGURED_FIELDS).unwrap_or(true),
                message: resolve_text(entry, MESSAGE_FIELDS),
            }
        }
        // `"gmail": true` style shorthand
        Value::Bool(healthy) => IntegrationServiceStatus {
            id: key.to_string(),
            name: key.to_string(),
            healthy: *healthy,
            configured: true,
            message: None,
        },
        _ => IntegrationServiceStatus {
            id: key.to_string(),
            name: key.to_string(),
            healthy: false,
            configured: true,
            message: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_services_key_is_unavailable() {
        assert!(parse_integrations(&json!({})).is_none());
        assert!(parse_integrations(&json!({"services": {}})).is_none());
        assert!(parse_integrations(&json!({"services": "down"})).is_none());
    }

    #[test]
    fn empty_collection_falls_through_to_next_key() {
        let raw = json!({"services": {}, "integrations": {"gmail": {"healthy": true}}});
        let summary = parse_integrations(&raw).expect("summary");
        assert_eq!(summary.total_services, 1);
        assert_eq!(summary.services[0].id, "gmail");
        assert_eq!(summary.overall, OverallHealth::Healthy);
    }

    #[test]
    fn mixed_health_is_degraded() {
        let raw = json!({"services": {"a": {"healthy": true}, "b": {"healthy": false}}});
        let summary = parse_integrations(&raw).expect("summary");
        assert_eq!(summary.healthy_count, 1);
        assert_eq!(summary.total_services, 2);
        assert_eq!(summary.overall, OverallHealth::Degraded);
    }

    #[test]
    fn defaults_for_missing_flags() {
        let raw = json!({"integrations": {"xero": {}}});
        let summary = parse_integrations(&raw).unwrap();
        let xero = &summary.services[0];
        assert!(!xero.healthy);
        assert!(xero.configured);
        assert_eq!(summary.overall, OverallHealth::Offline);
    }

    #[test]
    fn all_healthy() {
        let raw = json!({"services": {"gmail": {"healthy": true}, "notion": true}});
        let summary = parse_integrations(&raw).unwrap();
        assert_eq!(summary.overall, OverallHealth::Healthy);
        assert_eq!(summary.attention_needed().count(), 0);
    }

    #[test]
    fn explicit_overall_takes_precedence() {
        let raw = json!({
            "overall": "Degraded",
            "services": {"gmail": {"healthy": true}, "notion": {"healthy": true}}
        });
        assert_eq!(
            parse_integrations(&raw).unwrap().overall,
            OverallHealth::Degraded
        );

        let bogus = json!({"overall": "great", "services": {"gmail": {"healthy": true}}});
        assert_eq!(
            parse_integrations(&bogus).unwrap().overall,
            OverallHealth::Healthy
        );
    }

    #[test]
    fn status_string_and_messages() {
        let raw = json!({"services": {
            "supabase": {"status": "Connected", "displayName": "Supabase"},
            "gmail": {"healthy": false, "configured": false, "error": "OAuth token missing"}
        }});
        let summary = parse_integrations(&raw).unwrap();
        let gmail = summary.services.iter().find(|s| s.id == "gmail").unwrap();
        assert!(!gmail.configured);
        assert_eq!(gmail.message.as_deref(), Some("OAuth token missing"));
        let supabase = summary.services.iter().find(|s| s.id == "supabase").unwrap();
        assert!(supabase.healthy);
        assert_eq!(supabase.name, "Supabase");
    }

    #[test]
    fn array_shaped_services() {
        let raw = json!({"services": [{"id": "notion", "healthy": true}, {"healthy": false}]});
        let summary = parse_integrations(&raw).unwrap();
        assert_eq!(summary.services[0].id, "notion");
        assert_eq!(summary.services[1].id, "service-2");
    }
}
