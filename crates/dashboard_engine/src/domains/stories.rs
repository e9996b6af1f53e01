use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use crate::resolver::{resolve_date, resolve_records, resolve_string_list, resolve_text};

pub const LIST_FIELDS: &[&str] = &["stories", "highlights", "data", "items"];
pub const EXCERPT_MAX_CHARS: usize = 280;

const TITLE_FIELDS: &[&str] = &["title", "name", "headline"];
const EXCERPT_FIELDS: &[&str] = &["excerpt", "summary", "content", "story"];
const STORYTELLER_FIELDS: &[&str] = &["storyteller", "storyteller.name", "author", "storyteller_name"];
const THEME_FIELDS: &[&str] = &["themes", "tags", "theme"];
const PUBLISHED_FIELDS: &[&str] = &["publishedAt", "published_at", "created_at", "date"];

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryHighlight {
    pub title: String,
    pub excerpt: Option<String>,
    pub storyteller: Option<String>,
    pub themes: Vec<String>,
    #[schemars(with = "Option<String>")]
    pub published_at: Option<DateTime<Utc>>,
}

pub fn normalize_stories(payload: &Value) -> Option<Vec<StoryHighlight>> {
    let records = resolve_records(payload, LIST_FIELDS)?;
    Some(
        records
            .iter()
            .map(|raw| StoryHighlight {
                title: resolve_text(raw, TITLE_FIELDS).unwrap_or_else(|| "Untitled story".into()),
                excerpt: resolve_text(raw, EXCERPT_FIELDS).map(|e| truncate_excerpt(&e, EXCERPT_MAX_CHARS)),
                storyteller: resolve_text(raw, STORYTELLER_FIELDS),
                themes: resolve_string_list(raw, THEME_FIELDS).unwrap_or_default(),
                published_at: resolve_date(raw, PUBLISHED_FIELDS),
            })
            .collect(),
    )
}

/// Cut to at most `max` characters, appending an ellipsis when anything was
/// dropped.
pub fn truncate_excerpt(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn themes_accept_encoded_lists() {
        let payload = json!([
            {"title": "River", "themes": "[\"land\", \"water\"]"},
            {"title": "Market", "tags": "youth, enterprise"},
            {"title": "Quiet"},
        ]);
        let stories = normalize_stories(&payload).unwrap();
        assert_eq!(stories[0].themes, ["land", "water"]);
        assert_eq!(stories[1].themes, ["youth", "enterprise"]);
        assert!(stories[2].themes.is_empty());
    }

    #[test]
    fn excerpt_truncation_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_excerpt(&long, EXCERPT_MAX_CHARS);
        assert_eq!(cut.chars().count(), EXCERPT_MAX_CHARS + 1);
        assert!(cut.ends_with('…'));
        assert_eq!(truncate_excerpt("short", EXCERPT_MAX_CHARS), "short");
    }

    #[test]
    fn nested_storyteller() {
        let stories = normalize_stories(&json!({"stories": [
            {"title": "x", "storyteller": {"name": "Aunty May"}}
        ]}))
        .unwrap();
        assert_eq!(stories[0].storyteller.as_deref(), Some("Aunty May"));
    }
}
