//! The structured prescription record and its enrichment payload.
//!
//! Every field the primary LLM call may emit is optional: the model is asked
//! for a fixed schema but the only validation performed downstream is
//! JSON-parseability, so a missing `doctor` or an absent `medicines` array
//! must deserialise cleanly instead of failing the run. Enrichment fields
//! use `skip_serializing_if` so a medicine that was never enriched exports
//! exactly as the primary call produced it.

use serde::{Deserialize, Serialize};

/// The top-level structured result of analysing one prescription document.
///
/// Produced by a single chat-completion call; medicines are enriched in
/// place afterwards. Serialises to the `prescription_analysis.json` export
/// format (2-space indentation via `serde_json::to_string_pretty`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionRecord {
    /// Prescribing doctor's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<String>,

    /// Patient name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,

    /// Date exactly as written on the prescription. Kept as a free-form
    /// string: real prescriptions carry everything from "01/02/2024" to
    /// "2nd Feb '24" and normalising is out of scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Diagnosis lines, possibly empty.
    #[serde(default)]
    pub diagnosis: Vec<String>,

    /// Medicines identified in the prescription, possibly empty.
    #[serde(default)]
    pub medicines: Vec<Medicine>,
}

impl PrescriptionRecord {
    /// True when the primary call found no medicines at all (missing key or
    /// empty array — both render as the "no medications found" state).
    pub fn has_medicines(&self) -> bool {
        !self.medicines.is_empty()
    }
}

/// One medicine entry.
///
/// The first five fields come from the primary extraction call; the last
/// three are merged in by the per-medicine enrichment lookup and stay
/// `None` when that lookup fails or is skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    // ── Enrichment fields ─────────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_ingredients: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_alternatives: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism_of_action: Option<String>,
}

impl Medicine {
    /// Merge enrichment details into this entry.
    ///
    /// Only the three enrichment fields are written; the primary fields
    /// (name, strength, dosage, frequency, duration) are never overwritten.
    pub fn apply_details(&mut self, details: MedicineDetails) {
        if !details.active_ingredients.is_empty() {
            self.active_ingredients = Some(details.active_ingredients);
        }
        if !details.common_alternatives.is_empty() {
            self.common_alternatives = Some(details.common_alternatives);
        }
        if let Some(moa) = details.mechanism_of_action {
            if !moa.trim().is_empty() {
                self.mechanism_of_action = Some(moa);
            }
        }
    }

    /// True once any enrichment field has been populated.
    pub fn is_enriched(&self) -> bool {
        self.active_ingredients.is_some()
            || self.common_alternatives.is_some()
            || self.mechanism_of_action.is_some()
    }
}

/// Pharmacological metadata returned by the per-medicine lookup call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicineDetails {
    #[serde(default)]
    pub active_ingredients: Vec<String>,

    #[serde(default)]
    pub common_alternatives: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism_of_action: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paracetamol() -> Medicine {
        Medicine {
            name: Some("Paracetamol".into()),
            strength: Some("500mg".into()),
            dosage: Some("1 tablet".into()),
            frequency: Some("3x/day".into()),
            duration: Some("5 days".into()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_medicines_key_deserialises_to_empty() {
        let record: PrescriptionRecord =
            serde_json::from_str(r#"{"doctor":"Dr. A","diagnosis":["flu"]}"#).unwrap();
        assert_eq!(record.doctor.as_deref(), Some("Dr. A"));
        assert!(!record.has_medicines());
    }

    #[test]
    fn apply_details_merges_without_touching_primary_fields() {
        let mut med = paracetamol();
        med.apply_details(MedicineDetails {
            active_ingredients: vec!["paracetamol".into()],
            common_alternatives: vec!["acetaminophen".into()],
            mechanism_of_action: Some("inhibits prostaglandin synthesis".into()),
        });

        assert_eq!(med.name.as_deref(), Some("Paracetamol"));
        assert_eq!(med.strength.as_deref(), Some("500mg"));
        assert_eq!(
            med.active_ingredients,
            Some(vec!["paracetamol".to_string()])
        );
        assert_eq!(
            med.mechanism_of_action.as_deref(),
            Some("inhibits prostaglandin synthesis")
        );
        assert!(med.is_enriched());
    }

    #[test]
    fn empty_details_leave_entry_unenriched() {
        let mut med = paracetamol();
        med.apply_details(MedicineDetails::default());
        assert!(!med.is_enriched());
    }

    #[test]
    fn unenriched_medicine_serialises_without_enrichment_keys() {
        let json = serde_json::to_string(&paracetamol()).unwrap();
        assert!(!json.contains("active_ingredients"));
        assert!(!json.contains("mechanism_of_action"));
    }

    #[test]
    fn record_round_trips_through_json() {
        let mut med = paracetamol();
        med.apply_details(MedicineDetails {
            active_ingredients: vec!["paracetamol".into()],
            common_alternatives: vec!["acetaminophen".into()],
            mechanism_of_action: Some("inhibits prostaglandin synthesis".into()),
        });
        let record = PrescriptionRecord {
            doctor: Some("Dr. A".into()),
            patient: Some("B".into()),
            date: Some("2024-01-01".into()),
            diagnosis: vec!["flu".into()],
            medicines: vec![med],
        };

        let json = serde_json::to_string_pretty(&record).unwrap();
        let back: PrescriptionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
