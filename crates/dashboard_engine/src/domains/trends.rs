//! Trend extraction for chart series.
//!
//! Upstream trend arrays mix raw numbers, numeric strings and small objects
//! (`{"month": "Jan", "amount": 1200}`). Charts need at least two points, so
//! short series fall back to a synthetic one around the current value, or to
//! an explicit `InsufficientData` state.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use crate::resolver::{Coercion, Resolved, coerce, resolve_number};

/// Point fields tried after the caller's preferred ones.
pub const TREND_VALUE_FIELDS: &[&str] = &["value", "months", "metric", "amount", "total"];

pub const MIN_SERIES_LEN: usize = 2;

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(tag = "state", content = "points", rename_all = "snake_case")]
pub enum TrendSeries {
    Series(Vec<f64>),
    InsufficientData,
}

impl TrendSeries {
    /// Wrap extracted points, refusing anything too short to chart.
    pub fn from_points(points: Vec<f64>) -> Self {
        if points.len() >= MIN_SERIES_LEN {
            TrendSeries::Series(points)
        } else {
            TrendSeries::InsufficientData
        }
    }

    pub fn points(&self) -> &[f64] {
        match self {
            TrendSeries::Series(points) => points,
            TrendSeries::InsufficientData => &[],
        }
    }

    pub fn latest(&self) -> Option<f64> {
        self.points().last().copied()
    }

    pub fn is_renderable(&self) -> bool {
        matches!(self, TrendSeries::Series(_))
    }
}

/// Multipliers for the synthetic `[low × current, current, high × current]` series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyntheticBounds {
    pub low: f64,
    pub high: f64,
}

impl Default for SyntheticBounds {
    fn default() -> Self {
        Self {
            low: 0.8,
            high: 1.1,
        }
    }
}

impl SyntheticBounds {
    pub fn series(&self, current: f64) -> Vec<f64> {
        vec![self.low * current, current, self.high * current]
    }
}

/// Resolve each point to a finite number, dropping the ones that don't.
/// The input may be a native array or a JSON/CSV-encoded string.
pub fn extract_trend(points: Option<&Value>, preferred: &[&str]) -> Vec<f64> {
    let Some(Resolved::List(items)) = points.and_then(|v| coerce(v, Coercion::List)) else {
        return Vec::new();
    };
    let fields: Vec<&str> = preferred
        .iter()
        .chain(TREND_VALUE_FIELDS.iter().filter(|f| !preferred.contains(*f)))
        .copied()
        .collect();

    items
        .iter()
        .filter_map(|point| match point {
            Value::Object(_) => resolve_number(point, &fields),
            scalar => match coerce(scalar, Coercion::Number) {
                Some(Resolved::Number(n)) => Some(n),
                _ => None,
            },
        })
        .collect()
}

/// Extract a series, falling back to a synthetic one from `current` when the
/// upstream series is too short.
pub fn trend_series(
    points: Option<&Value>,
    preferred: &[&str],
    current: Option<f64>,
    bounds: SyntheticBounds,
) -> TrendSeries {
    let extracted = extract_trend(points, preferred);
    if extracted.len() >= MIN_SERIES_LEN {
        return TrendSeries::Series(extracted);
    }
    match current.filter(|c| c.is_finite()) {
        Some(c) => TrendSeries::Series(bounds.series(c)),
        None => TrendSeries::InsufficientData,
    }
}
