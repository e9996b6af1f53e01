//! Section selection for trimmed dashboard responses.
//!
//! A client that renders one panel asks for just the sections it needs
//! (`?sections=projects,projectRisk`); the load metadata always comes along.

use serde_json::{Map, Value};

/// Keys kept in every selected response.
pub const ALWAYS_INCLUDED: &[&str] = &["generation", "generatedAt", "unavailableSources"];

/// Keep only `fields` of a JSON object, in the order given. Non-objects are
/// returned unchanged.
pub fn compact_object(value: &Value, fields: &[&str]) -> Value {
    let Some(obj) = value.as_object() else {
        return value.clone();
    };
    let mut result = Map::new();
    for field in fields {
        if let Some(val) = obj.get(*field) {
            result.insert(field.to_string(), val.clone());
        }
    }
    Value::Object(result)
}

/// Split a comma-separated `sections` parameter, dropping blanks and repeats.
pub fn parse_section_list(raw: &str) -> Vec<String> {
    let mut sections: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !sections.iter().any(|s| s == name) {
            sections.push(name.to_string());
        }
    }
    sections
}

/// Reduce a serialized model to the requested sections plus the load
/// metadata. Unknown section names are rejected by name.
pub fn select_sections(model: &Value, sections: &[String]) -> Result<Value, String> {
    let Some(obj) = model.as_object() else {
        return Err("dashboard model is not an object".into());
    };
    let unknown: Vec<&str> = sections
        .iter()
        .map(String::as_str)
        .filter(|s| !obj.contains_key(*s))
        .collect();
    if !unknown.is_empty() {
        return Err(format!("unknown sections: {}", unknown.join(", ")));
    }
    let fields: Vec<&str> = ALWAYS_INCLUDED
        .iter()
        .copied()
        .chain(sections.iter().map(String::as_str))
        .collect();
    Ok(compact_object(model, &fields))
}
