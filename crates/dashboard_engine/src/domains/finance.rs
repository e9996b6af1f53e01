//! Revenue summary normalization, cash runway and the project revenue pipeline.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use super::projects::EnrichedProject;
use super::trends::{SyntheticBounds, TrendSeries, trend_series};
use crate::resolver::{first_present, resolve_count, resolve_number};

const TOTAL_REVENUE_FIELDS: &[&str] = &["totalRevenue", "total_revenue", "revenue.total", "arr"];
const RESERVE_FIELDS: &[&str] = &[
    "cashReserve",
    "cash_reserve",
    "reserve",
    "cashOnHand",
    "cash_on_hand",
];
const BURN_RATE_FIELDS: &[&str] = &["burnRate", "burn_rate", "monthlyBurn", "monthly_burn"];
const OVERDUE_INVOICE_FIELDS: &[&str] = &["overdueInvoices", "overdue_invoices", "invoices.overdue"];
const RECEIVABLES_FIELDS: &[&str] = &["outstandingReceivables", "receivables"];
const REVENUE_TREND_FIELDS: &[&str] = &[
    "revenueTrend",
    "revenue_trend",
    "trends.revenue",
    "monthlyRevenue",
];
const RUNWAY_TREND_FIELDS: &[&str] = &["runwayTrend", "runway_trend", "trends.runway"];
const REVENUE_POINT_FIELDS: &[&str] = &["amount", "total", "value"];
const RUNWAY_POINT_FIELDS: &[&str] = &["months"];

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total_revenue: Option<f64>,
    pub cash_reserve: Option<f64>,
    pub burn_rate: Option<f64>,
    pub overdue_invoices: Option<u64>,
    pub outstanding_receivables: Option<f64>,
    pub runway_months: Option<f64>,
    pub revenue_trend: TrendSeries,
    pub runway_trend: TrendSeries,
}

pub fn normalize_financial_summary(raw: &Value, bounds: SyntheticBounds) -> RevenueSummary {
    let total_revenue = resolve_number(raw, TOTAL_REVENUE_FIELDS);
    let cash_reserve = resolve_number(raw, RESERVE_FIELDS);
    let burn_rate = resolve_number(raw, BURN_RATE_FIELDS);
    let runway_months = cash_runway_months(cash_reserve, burn_rate);

    RevenueSummary {
        total_revenue,
        cash_reserve,
        burn_rate,
        overdue_invoices: resolve_count(raw, OVERDUE_INVOICE_FIELDS),
        outstanding_receivables: resolve_number(raw, RECEIVABLES_FIELDS),
        runway_months,
        revenue_trend: trend_series(
            first_present(raw, REVENUE_TREND_FIELDS),
            REVENUE_POINT_FIELDS,
            total_revenue,
            bounds,
        ),
        runway_trend: trend_series(
            first_present(raw, RUNWAY_TREND_FIELDS),
            RUNWAY_POINT_FIELDS,
            runway_months,
            bounds,
        ),
    }
}

/// `reserve / burn_rate`, unrounded. Absent unless burn is positive.
pub fn cash_runway_months(reserve: Option<f64>, burn_rate: Option<f64>) -> Option<f64> {
    let (reserve, burn) = (reserve?, burn_rate?);
    (burn > 0.0).then(|| reserve / burn)
}

#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePipeline {
    pub committed: f64,
    pub pipeline: f64,
    pub total: f64,
    pub contributing_projects: usize,
}

/// Sum actual (committed) and potential (pipeline) revenue across projects.
///
/// Each amount is rounded to whole cents (saturating at the `i64` range) and
/// accumulated in `i128`, which cannot overflow for any realistic list, so
/// the result does not depend on the order of the project list.
pub fn revenue_pipeline(projects: &[EnrichedProject]) -> RevenuePipeline {
    let to_cents = |v: Option<f64>| {
        v.map(|x| i128::from((x * 100.0).round() as i64))
            .unwrap_or(0)
    };
    let mut committed = 0i128;
    let mut pipeline = 0i128;
    let mut contributing_projects = 0;
    for project in projects {
        if project.revenue_actual.is_some() || project.revenue_potential.is_some() {
            contributing_projects += 1;
        }
        committed += to_cents(project.revenue_actual);
        pipeline += to_cents(project.revenue_potential);
    }
    RevenuePipeline {
        committed: committed as f64 / 100.0,
        pipeline: pipeline as f64 / 100.0,
        total: (committed + pipeline) as f64 / 100.0,
        contributing_projects,
    }
}
