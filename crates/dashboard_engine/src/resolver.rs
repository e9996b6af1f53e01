//! Field resolution over loosely-shaped upstream JSON.
//!
//! Every upstream source has drifted over time: the same datum shows up
//! under a canonical key, one or more legacy keys, or nested inside another
//! object. Callers describe the candidates in priority order and pick a
//! coercion; the first candidate that is present *and* coerces wins.
//!
//! Nothing in here panics or returns an error. Unresolvable input is `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// How a candidate value must be interpreted to count as resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coercion {
    Text,
    Number,
    Date,
    List,
    Flag,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Resolved {
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
    List(Vec<Value>),
    Flag(bool),
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Walk a dot-separated path. Object segments index by key, array segments
/// by decimal position.
pub fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// First candidate that is present and not `null`, without coercion.
pub fn first_present<'a>(record: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|path| lookup(record, path))
        .find(|v| !v.is_null())
}

pub fn resolve(record: &Value, candidates: &[&str], coercion: Coercion) -> Option<Resolved> {
    candidates
        .iter()
        .filter_map(|path| lookup(record, path))
        .find_map(|value| coerce(value, coercion))
}

pub fn coerce(value: &Value, coercion: Coercion) -> Option<Resolved> {
    match coercion {
        Coercion::Text => coerce_text(value).map(Resolved::Text),
        Coercion::Number => coerce_number(value).map(Resolved::Number),
        Coercion::Date => coerce_date(value).map(Resolved::Date),
        Coercion::List => coerce_list(value).map(Resolved::List),
        Coercion::Flag => coerce_flag(value).map(Resolved::Flag),
    }
}

pub fn resolve_text(record: &Value, candidates: &[&str]) -> Option<String> {
    match resolve(record, candidates, Coercion::Text) {
        Some(Resolved::Text(s)) => Some(s),
        _ => None,
    }
}

pub fn resolve_number(record: &Value, candidates: &[&str]) -> Option<f64> {
    match resolve(record, candidates, Coercion::Number) {
        Some(Resolved::Number(n)) => Some(n),
        _ => None,
    }
}

/// Non-negative whole count; fractional values are rounded.
pub fn resolve_count(record: &Value, candidates: &[&str]) -> Option<u64> {
    resolve_number(record, candidates)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u64)
}

pub fn resolve_date(record: &Value, candidates: &[&str]) -> Option<DateTime<Utc>> {
    match resolve(record, candidates, Coercion::Date) {
        Some(Resolved::Date(d)) => Some(d),
        _ => None,
    }
}

pub fn resolve_list(record: &Value, candidates: &[&str]) -> Option<Vec<Value>> {
    match resolve(record, candidates, Coercion::List) {
        Some(Resolved::List(items)) => Some(items),
        _ => None,
    }
}

/// List entries rendered as trimmed strings; non-scalar entries are skipped.
pub fn resolve_string_list(record: &Value, candidates: &[&str]) -> Option<Vec<String>> {
    let items: Vec<String> = resolve_list(record, candidates)?
        .iter()
        .filter_map(coerce_text)
        .collect();
    (!items.is_empty()).then_some(items)
}

pub fn resolve_flag(record: &Value, candidates: &[&str]) -> Option<bool> {
    match resolve(record, candidates, Coercion::Flag) {
        Some(Resolved::Flag(b)) => Some(b),
        _ => None,
    }
}

/// Locate the record list of a list-shaped payload: a root array first, then
/// the first candidate key holding an array. `None` means the payload has no
/// recognisable list at all; an empty list is still `Some`.
pub fn resolve_records<'a>(payload: &'a Value, candidates: &[&str]) -> Option<&'a [Value]> {
    if let Value::Array(items) = payload {
        return Some(items.as_slice());
    }
    candidates
        .iter()
        .filter_map(|path| lookup(payload, path))
        .find_map(|v| v.as_array().map(Vec::as_slice))
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn coerce_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date(s),
        Value::Number(n) => {
            let millis = n.as_f64().filter(|m| m.is_finite())?;
            Utc.timestamp_millis_opt(millis as i64).single()
        }
        _ => None,
    }
}

fn coerce_list(value: &Value) -> Option<Vec<Value>> {
    let items = match value {
        Value::Array(items) => items.clone(),
        Value::String(s) => {
            let trimmed = s.trim();
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Array(items)) => items,
                _ => trimmed
                    .split(',')
                    .map(|part| Value::String(part.trim().to_string()))
                    .collect(),
            }
        }
        _ => return None,
    };
    let kept: Vec<Value> = items
        .into_iter()
        .filter(|item| match item {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
        .collect();
    (!kept.is_empty()).then_some(kept)
}

fn coerce_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64()? {
            x if x == 1.0 => Some(true),
            x if x == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Parse the date shapes seen across upstream sources. Naive values are
/// taken as UTC; a bare date is UTC midnight.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}
