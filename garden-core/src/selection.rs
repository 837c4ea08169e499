//! Parsing of caller-supplied photo id lists.

use serde_json::Value;

/// Parses ids given either as a JSON array (`["a", "b"]`) or comma-separated (`a, b`).
///
/// Entries are trimmed and blanks dropped; a malformed JSON array falls back to comma
/// splitting. `None` or a blank string yields an empty list.
pub fn parse_id_list(raw: Option<&str>) -> Vec<String> {
    let Some(trimmed) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    if trimmed.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<Value>>(trimmed) {
            return items.into_iter().filter_map(normalize).collect();
        }
    }

    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize(item: Value) -> Option<String> {
    match item {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        other => Some(other.to_string()),
    }
}
