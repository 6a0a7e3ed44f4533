//! Evidence grounding: every quote must be a substring of the source it names.

pub mod similarity;
pub mod highlight;
pub mod repair;

pub use similarity::*;
pub use highlight::*;
pub use repair::*;

use crate::models::EvidenceSource;

/// The three source documents of one audit request.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceTexts<'a> {
    pub note: &'a str,
    pub labs: &'a str,
    pub meds: &'a str,
}

impl<'a> SourceTexts<'a> {
    pub fn new(note: &'a str, labs: &'a str, meds: &'a str) -> Self {
        Self { note, labs, meds }
    }

    /// Text for a source label. `Unknown` has no text.
    pub fn get(&self, source: EvidenceSource) -> Option<&'a str> {
        match source {
            EvidenceSource::Note => Some(self.note),
            EvidenceSource::Labs => Some(self.labs),
            EvidenceSource::Meds => Some(self.meds),
            EvidenceSource::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_has_no_text() {
        let sources = SourceTexts::new("n", "l", "m");
        assert_eq!(sources.get(EvidenceSource::Labs), Some("l"));
        assert_eq!(sources.get(EvidenceSource::Unknown), None);
    }
}
