use std::sync::LazyLock;

use regex::Regex;

use crate::models::truncate_chars;

/// Character caps applied to each input before it is embedded in the prompt.
pub mod input_caps {
    pub const NOTE_CHARS: usize = 15_000;
    pub const MEDS_CHARS: usize = 5_000;
    pub const LABS_CHARS: usize = 5_000;
}

/// Notes shorter than this many lines are sent unchanged.
const SHORT_NOTE_LINES: usize = 50;

/// Leading lines always kept (header and demographics).
const HEAD_LINES: usize = 10;

/// A pruned note shorter than this fell apart; use the head instead.
const MIN_PRUNED_CHARS: usize = 100;

/// Size of the head used when pruning fails.
const FALLBACK_HEAD_CHARS: usize = 2_000;

static CRITICAL_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(assessment|plan|recommendation|medication|allerg|hpi|history of present illness|impression|diagnosis)",
    )
    .unwrap()
});

static SIGNATURE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(signed by|dictated by|electronically signed)").unwrap()
});

/// Keywords that keep a line outside any critical block.
const CONTEXT_KEYWORDS: &[&str] = &[
    "mg", "daily", "tabs", "allergic", "reaction", "ckd", "aki", "k+",
];

/// Analytes kept by `trim_labs`.
const KEY_LABS: &[&str] = &[
    "egfr", "creatin", "potassium", "k ", "ast", "alt", "inr", "wbc", "bun", "lactate",
];

/// Prune a long clinical note to its safety-relevant sections.
pub fn trim_note(note: &str) -> String {
    let lines: Vec<&str> = note.split('\n').collect();
    if lines.len() < SHORT_NOTE_LINES {
        return note.to_string();
    }

    let mut kept: Vec<String> = lines[..HEAD_LINES].iter().map(|l| l.to_string()).collect();
    let mut in_critical_block = false;

    for line in &lines[HEAD_LINES..] {
        let clean = line.trim();
        if CRITICAL_HEADER.is_match(clean) {
            in_critical_block = true;
            kept.push(format!("\n--- {clean} ---"));
        }
        if SIGNATURE_LINE.is_match(clean) {
            in_critical_block = false;
        }

        let lower = clean.to_lowercase();
        if in_critical_block || CONTEXT_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            kept.push(line.to_string());
        }
    }

    let pruned = kept.join("\n");
    if pruned.chars().count() < MIN_PRUNED_CHARS {
        return truncate_chars(note, FALLBACK_HEAD_CHARS).to_string();
    }
    pruned
}

/// Keep only high-priority analyte lines, or everything if none match.
pub fn trim_labs(labs: &str) -> String {
    let kept: Vec<&str> = labs
        .split('\n')
        .filter(|line| {
            let lower = line.to_lowercase();
            KEY_LABS.iter().any(|lab| lower.contains(lab))
        })
        .collect();

    if kept.is_empty() {
        labs.to_string()
    } else {
        kept.join("\n")
    }
}

/// Drop blank lines and surrounding whitespace.
pub fn trim_meds(meds: &str) -> String {
    meds.split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inputs as they are embedded in the audit instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedInputs {
    pub note: String,
    pub labs: String,
    pub meds: String,
}

/// Trim and cap all three inputs.
pub fn prepare_inputs(note: &str, labs: &str, meds: &str) -> PreparedInputs {
    let note = trim_note(note);
    let labs = trim_labs(labs);
    let meds = trim_meds(meds);
    PreparedInputs {
        note: truncate_chars(&note, input_caps::NOTE_CHARS).to_string(),
        labs: truncate_chars(&labs, input_caps::LABS_CHARS).to_string(),
        meds: truncate_chars(&meds, input_caps::MEDS_CHARS).to_string(),
    }
}
