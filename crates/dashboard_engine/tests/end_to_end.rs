use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use dashboard_client::{DashboardError, Source, UpstreamClient};
use dashboard_engine::domains::alerts::{AlertKind, AlertSeverity};
use dashboard_engine::domains::integrations::OverallHealth;
use dashboard_engine::domains::pulse::{CONNECT_DATA_SOURCE, PulseValue};
use dashboard_engine::{DashboardOrchestrator, EngineConfig, Section};
use serde_json::{Value, json};

/// Serves fixed documents; every other source fails like a dead upstream.
struct FixtureClient {
    docs: HashMap<Source, Value>,
}

impl FixtureClient {
    fn new(docs: impl IntoIterator<Item = (Source, Value)>) -> Self {
        Self {
            docs: docs.into_iter().collect(),
        }
    }
}

#[async_trait]
impl UpstreamClient for FixtureClient {
    async fn fetch_source(&self, source: Source) -> Result<Value, DashboardError> {
        self.docs
            .get(&source)
            .cloned()
            .ok_or_else(|| DashboardError::Status {
                status: 503,
                body: "service unavailable".into(),
            })
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap()
}

fn orchestrator(docs: impl IntoIterator<Item = (Source, Value)>) -> DashboardOrchestrator {
    DashboardOrchestrator::new(Arc::new(FixtureClient::new(docs)), EngineConfig::default())
}

#[tokio::test]
async fn active_project_with_due_date_five_days_out() {
    let due = (now() + Duration::days(5)).to_rfc3339();
    let orchestrator = orchestrator([(
        Source::Projects,
        json!({"projects": [{"project_name": "Goods on Country", "status": "Active", "due_date": due}]}),
    )]);

    let model = orchestrator.load_at(now()).await;
    let groups = model.metrics.project_risk.as_ref().expect("grouped");
    assert_eq!(groups.active.len(), 1);
    assert!(groups.at_risk.is_empty());
    assert_eq!(groups.active[0].milestone_days, Some(5));
}

#[tokio::test]
async fn blocked_status_is_at_risk_without_a_date() {
    let orchestrator = orchestrator([(
        Source::Projects,
        json!([{"name": "Youth hub", "status": "Blocked - awaiting funding"}]),
    )]);

    let model = orchestrator.load_at(now()).await;
    let groups = model.metrics.project_risk.as_ref().expect("grouped");
    assert_eq!(groups.at_risk.len(), 1);
    assert!(groups.seeking_support.is_empty());
    assert!(groups.at_risk[0].milestone_days.is_none());
}

#[tokio::test]
async fn degraded_integrations_raise_an_alert_for_gmail() {
    let orchestrator = orchestrator([(
        Source::Integrations,
        json!({"services": {"gmail": {"healthy": false, "configured": false}, "notion": {"healthy": true}}}),
    )]);

    let model = orchestrator.load_at(now()).await;
    let summary = model.sources.integrations.as_ref().expect("integrations");
    assert_eq!(summary.overall, OverallHealth::Degraded);
    assert_eq!(summary.healthy_count, 1);
    assert_eq!(summary.total_services, 2);

    let alerts = &model.metrics.operations_alerts;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::Integration);
    assert_eq!(alerts[0].subject, "gmail");
    assert_eq!(alerts[0].severity, AlertSeverity::Critical);
}

#[tokio::test]
async fn every_source_failing_yields_placeholders() {
    let model = orchestrator(Vec::<(Source, Value)>::new())
        .load_at(now())
        .await;

    assert_eq!(model.unavailable_sources, Source::ALL.to_vec());
    assert_eq!(model.sources.revenue, Section::NoData);
    assert_eq!(model.sources.projects, Section::NoData);
    assert_eq!(model.metrics.project_risk, Section::NoData);
    assert_eq!(model.metrics.revenue_pipeline, Section::NoData);
    assert_eq!(model.metrics.high_risk_relationships, Section::NoData);
    assert!(model.metrics.operations_alerts.is_empty());
    assert_eq!(model.metrics.executive_pulse.len(), 5);
    assert!(
        model
            .metrics
            .executive_pulse
            .iter()
            .all(|e| e.value == PulseValue::Placeholder(CONNECT_DATA_SOURCE.into()))
    );

    let rendered = serde_json::to_value(&model).expect("serializable");
    assert_eq!(rendered["projects"], json!({"state": "no_data"}));
}

#[tokio::test]
async fn full_dashboard_from_every_source() {
    let orchestrator = orchestrator([
        (
            Source::FinancialSummary,
            json!({"totalRevenue": 480000, "cashReserve": 150000, "burnRate": 50000,
                   "revenueTrend": [{"amount": 30000}, {"amount": 41000}, {"amount": 45000}]}),
        ),
        (Source::Integrations, json!({"services": {"xero": true, "notion": true}})),
        (
            Source::Projects,
            json!([
                {"name": "A", "status": "Active", "owner": "Sam", "due_date": "2025-06-10", "revenueActual": 1000},
                {"name": "B", "status": "Seeking funding", "revenuePotential": "2500"},
                {"name": "C", "status": "Active", "due_date": "2025-05-01"},
            ]),
        ),
        (Source::Calendar, json!({"events": [{"title": "Board", "start": "2025-06-03T00:00:00Z"}]})),
        (Source::Mailbox, json!({"connected": true, "unreadCount": 4})),
        (
            Source::Contacts,
            json!({"total_contacts": 120, "supportersAwaitingFollowUp": 3,
                   "top_companies": [{"company": "Orange Sky", "avg_engagement_score": 0.3}]}),
        ),
        (Source::OutreachTasks, json!({"tasks": [{"title": "Call", "status": "done"}]})),
        (Source::Intelligence, json!({"insights": [{"title": "Renew grant", "priority": "high"}]})),
        (Source::Stories, json!({"stories": [{"title": "River", "themes": "land, water"}]})),
    ]);

    let model = orchestrator.load_at(now()).await;
    assert!(model.unavailable_sources.is_empty());

    let pipeline = model.metrics.revenue_pipeline.as_ref().expect("pipeline");
    assert_eq!(pipeline.committed, 1000.0);
    assert_eq!(pipeline.pipeline, 2500.0);

    let risky = model.metrics.high_risk_relationships.as_ref().expect("relationships");
    assert_eq!(risky.len(), 1);
    assert_eq!(risky[0].name, "Orange Sky");

    let portfolio = model.metrics.portfolio.as_ref().expect("portfolio");
    assert_eq!(portfolio.missing_lead, 2);
    assert_eq!(portfolio.overdue_milestones, 1);

    let kinds: Vec<_> = model.metrics.operations_alerts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, [AlertKind::Supporters, AlertKind::Milestones]);

    let revenue = model.sources.revenue.as_ref().expect("revenue");
    assert_eq!(revenue.runway_months, Some(3.0));
    assert_eq!(revenue.revenue_trend.points(), &[30000.0, 41000.0, 45000.0]);
}
