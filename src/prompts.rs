//! System prompts for the two chat-completion calls.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the target JSON schema is spelled out in
//!    exactly one place; the serde types in [`crate::record`] mirror it.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without a
//!    live model, making prompt regressions easy to catch.

/// System prompt for the primary structured-extraction call.
///
/// The schema listed here must stay in sync with
/// [`crate::record::PrescriptionRecord`].
pub const PARSE_SYSTEM_PROMPT: &str = r#"Extract prescription data as JSON with:
- doctor (string)
- patient (string)
- date (string)
- diagnosis (array of strings)
- medicines (array of {name, strength, dosage, frequency, duration})
Return ONLY valid JSON."#;

/// System prompt for the per-medicine pharmacology lookup.
///
/// The schema must stay in sync with [`crate::record::MedicineDetails`].
pub const ENRICH_SYSTEM_PROMPT: &str = r#"Provide detailed pharmacological information in JSON format about the given medicine including:
- active_ingredients (array of strings)
- common_alternatives (array of strings)
- mechanism_of_action (string)
Return ONLY valid JSON."#;

/// Build the user message for the primary extraction call.
pub fn parse_user_prompt(text: &str) -> String {
    format!("Prescription text:\n{text}")
}

/// Build the user message for a pharmacology lookup.
pub fn enrich_user_prompt(medicine_name: &str) -> String {
    format!("Medicine: {medicine_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_prompt_names_every_schema_field() {
        for field in ["doctor", "patient", "date", "diagnosis", "medicines"] {
            assert!(
                PARSE_SYSTEM_PROMPT.contains(field),
                "parse prompt is missing '{field}'"
            );
        }
    }

    #[test]
    fn enrich_prompt_names_every_detail_field() {
        for field in [
            "active_ingredients",
            "common_alternatives",
            "mechanism_of_action",
        ] {
            assert!(
                ENRICH_SYSTEM_PROMPT.contains(field),
                "enrich prompt is missing '{field}'"
            );
        }
    }

    #[test]
    fn user_prompts_embed_the_input() {
        assert!(parse_user_prompt("Rx: amoxicillin").contains("Rx: amoxicillin"));
        assert_eq!(enrich_user_prompt("Ibuprofen"), "Medicine: Ibuprofen");
    }
}
