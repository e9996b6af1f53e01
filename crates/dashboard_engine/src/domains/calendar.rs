use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use super::oldest_first;
use super::projects::days_until;
use crate::resolver::{resolve_date, resolve_records, resolve_text};

pub const LIST_FIELDS: &[&str] = &["events", "highlights", "data", "items"];
const TITLE_FIELDS: &[&str] = &["title", "summary", "name"];
const START_FIELDS: &[&str] = &["start", "startsAt", "start_time", "start.dateTime", "start.date"];
const END_FIELDS: &[&str] = &["end", "endsAt", "end_time", "end.dateTime", "end.date"];
const LOCATION_FIELDS: &[&str] = &["location", "venue"];

pub const UNTITLED_EVENT: &str = "Untitled event";

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarHighlight {
    pub title: String,
    #[schemars(with = "Option<String>")]
    pub starts_at: Option<DateTime<Utc>>,
    #[schemars(with = "Option<String>")]
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub days_until: Option<i64>,
}

/// Normalize calendar highlights, ordered by start time with undated events
/// last. `None` when the payload carries no event list.
pub fn normalize_calendar(payload: &Value, now: DateTime<Utc>) -> Option<Vec<CalendarHighlight>> {
    let records = resolve_records(payload, LIST_FIELDS)?;
    let mut events: Vec<CalendarHighlight> = records
        .iter()
        .map(|raw| {
            let starts_at = resolve_date(raw, START_FIELDS);
            CalendarHighlight {
                title: resolve_text(raw, TITLE_FIELDS).unwrap_or_else(|| UNTITLED_EVENT.into()),
                starts_at,
                ends_at: resolve_date(raw, END_FIELDS),
                location: resolve_text(raw, LOCATION_FIELDS),
                days_until: starts_at.map(|s| days_until(s, now)),
            }
        })
        .collect();
    events.sort_by(|a, b| oldest_first(a.starts_at, b.starts_at));
    Some(events)
}
