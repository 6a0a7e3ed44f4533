use super::preprocess::PreparedInputs;

pub const AUDIT_INSTRUCTION: &str = r#"
You are a clinical safety reviewer. Your ONLY role is to identify potential
safety issues in the patient record below for a clinician to review. You do not
make decisions and you do not give orders.

RULES (ABSOLUTE, NO EXCEPTIONS):
1. Every flag MUST cite at least one verbatim quote copied exactly from the
   record, with the section it came from (NOTE, LABS or MEDS).
2. NEVER invent values, medications or history that are not written below.
3. Use advisory language ("consider", "review", "may"). Never write orders
   such as "stop", "start" or "administer".
4. If something needed for a safe decision is missing, ask about it in
   missing_info_questions instead of guessing.
5. Output MUST be a single valid JSON object and nothing else.

Categories: MEDICATION_INTERACTION, CONTRAINDICATION, MISSING_MONITORING,
DOSAGE_ERROR, ALLERGY, CLINICAL_MISMATCH, OTHER.
Severities: HIGH, MEDIUM, LOW.

OUTPUT FORMAT:
{
  "summary": "one or two sentences",
  "flags": [
    {
      "category": "CATEGORY",
      "severity": "HIGH | MEDIUM | LOW",
      "confidence": 0.0,
      "explanation": "why this may be a safety issue",
      "recommendation": "what the clinician may consider reviewing",
      "evidence": [{"quote": "verbatim text", "source": "NOTE | LABS | MEDS"}]
    }
  ],
  "missing_info_questions": ["question"]
}
"#;

/// Build the full audit instruction for one request.
pub fn build_audit_prompt(inputs: &PreparedInputs) -> String {
    format!(
        "{AUDIT_INSTRUCTION}\nInput Data:\nClinical Note:\n{}\n\nMedications:\n{}\n\nLabs:\n{}\n",
        inputs.note, inputs.meds, inputs.labs
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_all_sections_in_order() {
        let prompt = build_audit_prompt(&PreparedInputs {
            note: "NOTE-TEXT".into(),
            labs: "LABS-TEXT".into(),
            meds: "MEDS-TEXT".into(),
        });
        let note = prompt.find("NOTE-TEXT").unwrap();
        let meds = prompt.find("MEDS-TEXT").unwrap();
        let labs = prompt.find("LABS-TEXT").unwrap();
        assert!(note < meds && meds < labs);
    }

    #[test]
    fn instruction_demands_verbatim_evidence() {
        assert!(AUDIT_INSTRUCTION.contains("verbatim"));
        assert!(AUDIT_INSTRUCTION.contains("missing_info_questions"));
    }
}
