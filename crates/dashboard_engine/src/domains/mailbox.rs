//! Mailbox connection status and recent community email.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use super::newest_first;
use crate::resolver::{first_present, resolve_count, resolve_date, resolve_flag, resolve_text};

pub const RECENT_EMAIL_LIMIT: usize = 5;

const CONNECTED_FIELDS: &[&str] = &["connected", "isConnected", "authenticated", "status.connected"];
const ADDRESS_FIELDS: &[&str] = &["email", "emailAddress", "email_address", "account"];
const UNREAD_FIELDS: &[&str] = &["unreadCount", "unread_count", "unread"];
const LAST_SYNC_FIELDS: &[&str] = &["lastSync", "last_sync", "lastSyncedAt", "last_synced_at"];
const RECENT_FIELDS: &[&str] = &["recentEmails", "recent_emails", "communityEmails", "emails", "messages"];

const SENDER_FIELDS: &[&str] = &["from", "sender", "from.name", "from.email"];
const SUBJECT_FIELDS: &[&str] = &["subject", "title"];
const SNIPPET_FIELDS: &[&str] = &["snippet", "preview", "body"];
const RECEIVED_FIELDS: &[&str] = &["date", "receivedAt", "received_at", "internalDate"];

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MailboxStatus {
    pub connected: bool,
    pub email_address: Option<String>,
    pub unread_count: Option<u64>,
    #[schemars(with = "Option<String>")]
    pub last_sync: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunityEmail {
    pub sender: String,
    pub subject: String,
    pub snippet: Option<String>,
    #[schemars(with = "Option<String>")]
    pub received_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MailboxSnapshot {
    pub status: MailboxStatus,
    pub recent_emails: Vec<CommunityEmail>,
}

/// A mailbox document without a connection flag is reported as
/// disconnected. Recent emails are newest first, capped at `limit`.
pub fn normalize_mailbox(raw: &Value, limit: usize) -> MailboxSnapshot {
    let status = MailboxStatus {
        connected: resolve_flag(raw, CONNECTED_FIELDS).unwrap_or(false),
        email_address: resolve_text(raw, ADDRESS_FIELDS),
        unread_count: resolve_count(raw, UNREAD_FIELDS),
        last_sync: resolve_date(raw, LAST_SYNC_FIELDS),
    };

    let mut recent_emails: Vec<CommunityEmail> = first_present(raw, RECENT_FIELDS)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|m| CommunityEmail {
                    sender: resolve_text(m, SENDER_FIELDS).unwrap_or_else(|| "Unknown sender".into()),
                    subject: resolve_text(m, SUBJECT_FIELDS).unwrap_or_else(|| "(no subject)".into()),
                    snippet: resolve_text(m, SNIPPET_FIELDS),
                    received_at: resolve_date(m, RECEIVED_FIELDS),
                })
                .collect()
        })
        .unwrap_or_default();
    recent_emails.sort_by(|a, b| newest_first(a.received_at, b.received_at));
    recent_emails.truncate(limit);

    MailboxSnapshot {
        status,
        recent_emails,
    }
}
