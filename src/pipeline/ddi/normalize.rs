use std::sync::LazyLock;

use regex::Regex;

use super::reference::generic_name;

/// Leading bullet or numbering, then a 1-40 char name of letters, hyphens and
/// spaces, ending at whitespace or end of line.
static MED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\s\-•*\d.)]*([A-Za-z][A-Za-z\- ]{0,39})(?:\s|$)").unwrap()
});

/// Candidate drug name at the start of a fragment, lowercased.
fn leading_name(fragment: &str) -> Option<String> {
    MED_LINE
        .captures(fragment.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_lowercase())
        .filter(|name| !name.is_empty())
}

/// Raw (pre-normalization) names found on one line: the leading name plus the
/// leading name of every comma-separated part.
fn line_candidates(line: &str) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(name) = leading_name(line) {
        names.push(name);
    }
    if line.contains(',') {
        names.extend(line.split(',').filter_map(leading_name));
    }
    names
}

/// Parse a free-text medication list into de-duplicated generic names, in
/// first-seen order.
pub fn extract_medications(meds_text: &str) -> Vec<String> {
    let mut generics: Vec<String> = Vec::new();

    for line in meds_text.lines().filter(|l| !l.trim().is_empty()) {
        for raw in line_candidates(line) {
            let generic = generic_name(&raw).to_string();
            if !generics.contains(&generic) {
                generics.push(generic);
            }
        }
    }

    tracing::debug!(count = generics.len(), "Extracted medications");
    generics
}

/// Lines of the medication text that mention `generic` (directly or by brand).
pub fn lines_mentioning<'a>(meds_text: &'a str, generic: &str) -> Vec<&'a str> {
    meds_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            line_candidates(line)
                .iter()
                .any(|raw| generic_name(raw) == generic)
        })
        .collect()
}
