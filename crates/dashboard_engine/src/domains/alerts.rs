use schemars::JsonSchema;
use serde::Serialize;

use super::integrations::IntegrationSummary;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Integration,
    Supporters,
    Milestones,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperationsAlert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub subject: String,
    pub message: String,
}

/// Integration alerts first (in service order), then supporters, then
/// milestones. Counts of zero and unavailable inputs raise nothing.
pub fn operations_alerts(
    integrations: Option<&IntegrationSummary>,
    awaiting_follow_up: Option<u64>,
    overdue_milestones: Option<usize>,
) -> Vec<OperationsAlert> {
    let mut alerts: Vec<OperationsAlert> = integrations
        .into_iter()
        .flat_map(|summary| summary.attention_needed())
        .map(|service| {
            if !service.healthy {
                OperationsAlert {
                    kind: AlertKind::Integration,
                    severity: AlertSeverity::Critical,
                    subject: service.id.clone(),
                    message: format!(
                        "{}: {}",
                        service.name,
                        service.message.as_deref().unwrap_or("reporting unhealthy")
                    ),
                }
            } else {
                OperationsAlert {
                    kind: AlertKind::Integration,
                    severity: AlertSeverity::Warning,
                    subject: service.id.clone(),
                    message: format!("{} is not configured", service.name),
                }
            }
        })
        .collect();

    if let Some(n) = awaiting_follow_up.filter(|n| *n > 0) {
        alerts.push(OperationsAlert {
            kind: AlertKind::Supporters,
            severity: AlertSeverity::Warning,
            subject: "supporters".into(),
            message: format!("{n} supporters awaiting follow-up"),
        });
    }
    if let Some(n) = overdue_milestones.filter(|n| *n > 0) {
        alerts.push(OperationsAlert {
            kind: AlertKind::Milestones,
            severity: AlertSeverity::Warning,
            subject: "milestones".into(),
            message: format!("{n} milestones overdue"),
        });
    }
    alerts
}
