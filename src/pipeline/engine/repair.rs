use std::sync::LazyLock;

use regex::Regex;

// "key","value" followed by , or }
static KEY_VALUE_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"\s*,\s*"([^"]+)"(\s*[,}])"#).unwrap());

// "key",[ ...
static KEY_ARRAY_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"\s*,\s*(\[)"#).unwrap());

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// Strip markdown fences and any prose around the outermost JSON object.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    let text = text.trim();

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Repair common formatting faults in generated JSON.
///
/// Fixes `"key","value"` written in place of `"key": "value"`, the same fault
/// before an array, and trailing commas before `}` or `]`.
pub fn repair_json(raw: &str) -> String {
    let text = strip_fences(raw);
    let repaired = KEY_VALUE_PAIR.replace_all(text, r#""$1": "$2"$3"#);
    let repaired = KEY_ARRAY_PAIR.replace_all(&repaired, r#""$1": $2"#);
    TRAILING_COMMA.replace_all(&repaired, "$1").into_owned()
}

/// Parse generated JSON, applying repairs only when the text does not parse as-is.
pub fn parse_generated_json(raw: &str) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::from_str(strip_fences(raw)).or_else(|_| serde_json::from_str(&repair_json(raw)))
}
