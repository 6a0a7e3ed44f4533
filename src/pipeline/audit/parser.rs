use serde_json::Value;

use crate::models::{
    Evidence, EvidenceSource, FlagCategory, FlagOrigin, SafetyFlag, SafetyReport, Severity,
};

/// Confidence used when neither the flag nor the response carries one.
pub const DEFAULT_CONFIDENCE: f32 = 0.8;

pub const DEFAULT_SUMMARY: &str = "No summary provided.";

/// Map the engine's structured output onto a report, inserting defaults for
/// anything missing or malformed. Every repair is listed in
/// `metadata.shape_repairs`.
pub fn parse_findings(raw: &Value) -> SafetyReport {
    let mut repairs: Vec<String> = Vec::new();

    let empty = serde_json::Map::new();
    let root = match raw.as_object() {
        Some(obj) => obj,
        None => {
            repairs.push("response was not a JSON object".into());
            &empty
        }
    };

    let summary = match root.get("summary").and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => {
            repairs.push("summary missing, defaulted".into());
            DEFAULT_SUMMARY.to_string()
        }
    };

    let missing_info_questions = match root.get("missing_info_questions").and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect(),
        None => {
            repairs.push("missing_info_questions missing, defaulted to []".into());
            Vec::new()
        }
    };

    let default_confidence = root
        .get("confidence_score")
        .and_then(Value::as_f64)
        .map(|c| c as f32)
        .unwrap_or(DEFAULT_CONFIDENCE);

    let flags = match root.get("flags").and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| parse_flag(i, item, default_confidence, &mut repairs))
            .collect(),
        None => {
            repairs.push("flags missing, defaulted to []".into());
            Vec::new()
        }
    };

    let mut report = SafetyReport::new(summary, flags, missing_info_questions);
    report.patient_demographics = root
        .get("patient_demographics")
        .filter(|v| v.is_object())
        .cloned();

    if !repairs.is_empty() {
        tracing::warn!(repair_count = repairs.len(), "Engine output shape repaired");
    }
    report.metadata.shape_repairs = repairs;
    report
}

fn parse_flag(
    index: usize,
    item: &Value,
    default_confidence: f32,
    repairs: &mut Vec<String>,
) -> Option<SafetyFlag> {
    let Some(obj) = item.as_object() else {
        repairs.push(format!("flags[{index}] is not an object, skipped"));
        return None;
    };

    let explanation = obj
        .get("explanation")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();

    let severity = match obj.get("severity").and_then(Value::as_str) {
        Some(s) => s.parse::<Severity>().unwrap_or_else(|_| {
            repairs.push(format!("flags[{index}].severity '{s}' defaulted to MEDIUM"));
            Severity::Medium
        }),
        None => {
            repairs.push(format!("flags[{index}].severity missing, defaulted to MEDIUM"));
            Severity::Medium
        }
    };

    let category_tag = obj.get("category").and_then(Value::as_str).unwrap_or("");
    let category = FlagCategory::resolve(category_tag, &explanation);

    let confidence = obj
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c as f32)
        .unwrap_or(default_confidence)
        .clamp(0.0, 1.0);

    let recommendation = obj
        .get("recommendation")
        .and_then(text_or_list)
        .or_else(|| obj.get("check_steps").and_then(text_or_list))
        .filter(|r| !r.is_empty());

    let evidence = match obj.get("evidence") {
        Some(Value::Array(items)) => items.iter().filter_map(parse_evidence).collect(),
        Some(single @ (Value::String(_) | Value::Object(_))) => {
            parse_evidence(single).into_iter().collect()
        }
        _ => Vec::new(),
    };

    Some(SafetyFlag {
        category,
        severity,
        confidence,
        evidence,
        explanation,
        recommendation,
        origin: FlagOrigin::Model,
    })
}

/// A bare string is a NOTE quote; an object carries `quote` and `source`.
fn parse_evidence(item: &Value) -> Option<Evidence> {
    match item {
        Value::String(quote) => Some(Evidence::new(quote, EvidenceSource::Note)),
        Value::Object(obj) => {
            let quote = obj.get("quote").and_then(Value::as_str).unwrap_or("");
            let source = obj
                .get("source")
                .and_then(Value::as_str)
                .map(EvidenceSource::parse_lenient)
                .unwrap_or(EvidenceSource::Note);
            Some(Evidence::new(quote, source))
        }
        _ => None,
    }
}

fn text_or_list(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    }
}
