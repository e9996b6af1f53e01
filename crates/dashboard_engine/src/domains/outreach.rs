//! Outreach tasks and their status tally.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use crate::resolver::{resolve_date, resolve_records, resolve_text};

pub const LIST_FIELDS: &[&str] = &["tasks", "data", "items"];
const TITLE_FIELDS: &[&str] = &["title", "name", "task", "subject"];
const STATUS_FIELDS: &[&str] = &["status", "state"];
const DUE_FIELDS: &[&str] = &["dueDate", "due_date", "due", "deadline"];
const ASSIGNEE_FIELDS: &[&str] = &["assignee", "owner", "assigned_to", "assignee.name"];

pub const UNTITLED_TASK: &str = "Untitled task";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Blocked,
    Other,
}

impl TaskStatus {
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "pending" | "todo" | "to_do" | "open" | "not_started" | "new" => TaskStatus::Pending,
            "in_progress" | "active" | "doing" | "started" => TaskStatus::InProgress,
            "completed" | "complete" | "done" | "closed" => TaskStatus::Completed,
            "blocked" | "on_hold" | "waiting" => TaskStatus::Blocked,
            _ => TaskStatus::Other,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutreachTask {
    pub title: String,
    pub status: TaskStatus,
    pub raw_status: Option<String>,
    #[schemars(with = "Option<String>")]
    pub due_date: Option<DateTime<Utc>>,
    pub assignee: Option<String>,
}

impl OutreachTask {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TaskStatus::Completed && self.due_date.is_some_and(|d| d < now)
    }
}

/// Tasks without a status are `Pending`.
pub fn normalize_tasks(payload: &Value) -> Option<Vec<OutreachTask>> {
    let records = resolve_records(payload, LIST_FIELDS)?;
    Some(
        records
            .iter()
            .map(|raw| {
                let raw_status = resolve_text(raw, STATUS_FIELDS);
                OutreachTask {
                    title: resolve_text(raw, TITLE_FIELDS).unwrap_or_else(|| UNTITLED_TASK.into()),
                    status: raw_status
                        .as_deref()
                        .map(TaskStatus::parse)
                        .unwrap_or(TaskStatus::Pending),
                    raw_status,
                    due_date: resolve_date(raw, DUE_FIELDS),
                    assignee: resolve_text(raw, ASSIGNEE_FIELDS),
                }
            })
            .collect(),
    )
}

#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskTally {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub blocked: usize,
    pub other: usize,
    pub overdue: usize,
}

pub fn tally_tasks(tasks: &[OutreachTask], now: DateTime<Utc>) -> TaskTally {
    tasks.iter().fold(TaskTally::default(), |mut tally, task| {
        tally.total += 1;
        match task.status {
            TaskStatus::Pending => tally.pending += 1,
            TaskStatus::InProgress => tally.in_progress += 1,
            TaskStatus::Completed => tally.completed += 1,
            TaskStatus::Blocked => tally.blocked += 1,
            TaskStatus::Other => tally.other += 1,
        }
        if task.is_overdue(now) {
            tally.overdue += 1;
        }
        tally
    })
}
