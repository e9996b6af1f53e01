//! Per-source normalization and the derivations built on top of it.
//!
//! Each module owns one upstream shape: its candidate field lists, its
//! canonical type and the pure functions that produce it. Nothing in here
//! performs I/O or returns an error.
//!
//! # Modules
//!
//! - [`projects`]: Project records, risk grouping and portfolio counters
//! - [`trends`]: Chart series extraction with synthetic fallback
//! - [`integrations`]: Service-health parsing and overall health
//! - [`finance`]: Revenue summary, cash runway and revenue pipeline
//! - [`relationships`]: Contact metrics, high-risk relationships, partner momentum
//! - [`outreach`]: Outreach tasks and the status tally
//! - [`calendar`]: Upcoming calendar highlights
//! - [`mailbox`]: Mailbox status and recent community email
//! - [`insights`]: AI insights ordered by priority
//! - [`stories`]: Story highlights with truncated excerpts
//! - [`pulse`]: Executive pulse entries
//! - [`alerts`]: Operations alerts

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

pub mod alerts;
pub mod calendar;
pub mod finance;
pub mod insights;
pub mod integrations;
pub mod mailbox;
pub mod outreach;
pub mod projects;
pub mod pulse;
pub mod relationships;
pub mod stories;
pub mod trends;

/// Ascending by date with undated entries last.
pub(crate) fn oldest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending by date with undated entries last.
pub(crate) fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        _ => oldest_first(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn undated_sorts_last_both_ways() {
        let early = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let late = Some(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
        let mut dates = vec![None, late, early];
        dates.sort_by(|a, b| oldest_first(*a, *b));
        assert_eq!(dates, [early, late, None]);
        dates.sort_by(|a, b| newest_first(*a, *b));
        assert_eq!(dates, [late, early, None]);
    }
}
