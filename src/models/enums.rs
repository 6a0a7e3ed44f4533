use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate an enum with upper-case wire names, `as_str` and a
/// case-insensitive `std::str::FromStr`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Severity {
    High => "HIGH",
    Medium => "MEDIUM",
    Low => "LOW",
});

impl Severity {
    /// Sort rank, HIGH first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

str_enum!(EvidenceSource {
    Note => "NOTE",
    Labs => "LABS",
    Meds => "MEDS",
    Unknown => "UNKNOWN",
});

impl EvidenceSource {
    /// The three groundable sources, in search order.
    pub const GROUNDABLE: [EvidenceSource; 3] = [Self::Note, Self::Labs, Self::Meds];

    /// Map the loose labels models produce ("Medications", "lab", "Clinical Note")
    /// onto a source. Anything unrecognised is `Unknown`.
    pub fn parse_lenient(label: &str) -> Self {
        if let Ok(source) = label.parse::<Self>() {
            return source;
        }
        let lower = label.trim().to_lowercase();
        if lower.starts_with("med") || lower.contains("medication") {
            Self::Meds
        } else if lower.starts_with("lab") {
            Self::Labs
        } else if lower.contains("note") {
            Self::Note
        } else {
            Self::Unknown
        }
    }
}

str_enum!(FlagCategory {
    MedicationInteraction => "MEDICATION_INTERACTION",
    Contraindication => "CONTRAINDICATION",
    MissingMonitoring => "MISSING_MONITORING",
    DosageError => "DOSAGE_ERROR",
    Allergy => "ALLERGY",
    ClinicalMismatch => "CLINICAL_MISMATCH",
    Other => "OTHER",
});

impl FlagCategory {
    /// Resolve a category tag, falling back to a keyword classifier over the
    /// explanation when the tag is not one of ours.
    pub fn resolve(tag: &str, explanation: &str) -> Self {
        tag.parse()
            .unwrap_or_else(|_| Self::classify_fallback(explanation))
    }

    /// Deterministic fallback classifier for unrecognised category tags.
    pub fn classify_fallback(explanation: &str) -> Self {
        let lower = explanation.to_lowercase();
        if lower.contains("allergy") || lower.contains("allergic") {
            Self::Allergy
        } else if lower.contains("interaction") && lower.contains("medication") {
            Self::MedicationInteraction
        } else {
            Self::Other
        }
    }
}
