use chrono::{DateTime, TimeZone, Utc};
use dashboard_client::Source;
use dashboard_engine::domains::finance::revenue_pipeline;
use dashboard_engine::domains::integrations::{OverallHealth, parse_integrations};
use dashboard_engine::domains::projects::{
    UNASSIGNED_OWNER, UNKNOWN_STATUS, UNTITLED_PROJECT, group_by_risk, normalize_project,
    normalize_projects,
};
use dashboard_engine::domains::trends::{
    MIN_SERIES_LEN, SyntheticBounds, TrendSeries, extract_trend, trend_series,
};
use dashboard_engine::{EngineConfig, SourcePayloads, assemble};
use serde_json::{Map, Value, json};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn full_record() -> Map<String, Value> {
    json!({
        "project_id": "p-1",
        "project_name": "Goods on Country",
        "status": "Seeking support",
        "nextMilestoneDate": "2025-06-20",
        "focusArea": "Economic Freedom",
        "owner": "Jo",
        "fundingGap": 25000,
        "revenueActual": "1200.50",
        "potentialIncoming": 800,
    })
    .as_object()
    .cloned()
    .unwrap_or_default()
}

#[test]
fn normalize_holds_invariants_for_every_field_subset() {
    let full = full_record();
    let keys: Vec<&String> = full.keys().collect();
    for mask in 0u32..(1 << keys.len()) {
        let subset: Map<String, Value> = keys
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, k)| ((*k).clone(), full[k.as_str()].clone()))
            .collect();
        let project = normalize_project(&Value::Object(subset.clone()), now());

        assert!(!project.name.is_empty());
        assert!(!project.status.is_empty());
        assert!(!project.owner.is_empty());
        assert_eq!(project.milestone_date.is_some(), project.milestone_days.is_some());
        if !subset.contains_key("project_name") {
            assert_eq!(project.name, UNTITLED_PROJECT);
        }
        if !subset.contains_key("status") {
            assert_eq!(project.status, UNKNOWN_STATUS);
        }
        if !subset.contains_key("owner") {
            assert_eq!(project.owner, UNASSIGNED_OWNER);
        }
    }
}

#[test]
fn malformed_values_never_drop_the_record() {
    let payload = json!([
        {"name": 12, "status": null, "due_date": "31/02/2025", "fundingGap": {"a": 1}},
        "not even an object",
        null,
    ]);
    let projects = normalize_projects(&payload, now()).expect("list");
    assert_eq!(projects.len(), 3);
    assert_eq!(projects[0].name, "12");
    assert!(projects[0].milestone_days.is_none());
    assert!(projects[0].funding_gap.is_none());
    assert_eq!(projects[1].name, UNTITLED_PROJECT);
}

#[test]
fn short_trends_never_leak_a_single_point() {
    let inputs = [None, Some(json!([])), Some(json!([5])), Some(json!(["x", null]))];
    for input in &inputs {
        for current in [None, Some(100.0)] {
            let series = trend_series(input.as_ref(), &[], current, SyntheticBounds::default());
            match &series {
                TrendSeries::Series(points) => assert!(points.len() >= MIN_SERIES_LEN),
                TrendSeries::InsufficientData => assert!(current.is_none()),
            }
        }
        assert!(extract_trend(input.as_ref(), &[]).len() < MIN_SERIES_LEN);
    }
}

#[test]
fn integration_examples() {
    assert!(parse_integrations(&json!({})).is_none());

    let summary =
        parse_integrations(&json!({"services": {"a": {"healthy": true}, "b": {"healthy": false}}}))
            .expect("summary");
    assert_eq!(summary.healthy_count, 1);
    assert_eq!(summary.total_services, 2);
    assert_eq!(summary.overall, OverallHealth::Degraded);

    let offline = parse_integrations(&json!({"services": {"a": {}, "b": {"healthy": false}}}))
        .expect("summary");
    assert_eq!(offline.overall, OverallHealth::Offline);
}

fn portfolio() -> Value {
    json!([
        {"name": "a", "status": "Active", "actualIncoming": 0.1, "potentialIncoming": 0.2},
        {"name": "b", "status": "On hold - at risk", "revenueActual": 1999.99},
        {"name": "c", "status": "Seeking funding", "revenuePotential": "0.7"},
        {"name": "d", "status": "paused", "due_date": "2025-05-01"},
        {"name": "e", "status": "Delivering", "due_date": "2025-05-30", "revenueActual": "x"},
        {"name": "f", "status": "Needs SUPPORT", "revenueActual": 0.3, "revenuePotential": 1e6},
    ])
}

#[test]
fn risk_grouping_partitions_every_project() {
    let projects = normalize_projects(&portfolio(), now()).expect("list");
    let groups = group_by_risk(&projects);
    assert_eq!(groups.total(), projects.len());

    let mut names: Vec<&str> = groups
        .active
        .iter()
        .chain(&groups.seeking_support)
        .chain(&groups.at_risk)
        .map(|p| p.name.as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, ["a", "b", "c", "d", "e", "f"]);
}

#[test]
fn pipeline_is_order_independent() {
    let projects = normalize_projects(&portfolio(), now()).expect("list");
    let forward = revenue_pipeline(&projects);

    let mut reversed = projects.clone();
    reversed.reverse();
    assert_eq!(revenue_pipeline(&reversed), forward);

    let mut rotated = projects.clone();
    rotated.rotate_left(2);
    assert_eq!(revenue_pipeline(&rotated), forward);

    assert_eq!(forward.committed, 2000.39);
}

#[test]
fn assembly_is_idempotent() {
    let payloads = SourcePayloads::new()
        .with(Source::Projects, portfolio())
        .with(
            Source::FinancialSummary,
            json!({"totalRevenue": "125000", "revenueTrend": "[1, 2, 3]"}),
        )
        .with(
            Source::Contacts,
            json!({"critical_contacts": [], "top_companies": [{"company": "x", "avg_engagement_score": 0.1}]}),
        );
    let config = EngineConfig::default();

    let first = serde_json::to_string(&assemble(&payloads, now(), 7, &config)).expect("json");
    let second = serde_json::to_string(&assemble(&payloads, now(), 7, &config)).expect("json");
    assert_eq!(first, second);
}
