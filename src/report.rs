//! Terminal report rendering for an analysed prescription.
//!
//! The original tool rendered these sections as styled web cards; here they
//! become plain text the CLI prints (and colours). Rendering policy is the
//! same: a missing field shows an explicit "Not specified" placeholder
//! rather than being omitted, and an empty medicine list renders a clear
//! "no medications found" state.

use crate::record::{Medicine, PrescriptionRecord};
use std::fmt::Write;

/// Placeholder for fields the extraction left empty.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Message shown when the record carries no medicines.
pub const NO_MEDICATIONS: &str = "No medications found in the prescription";

/// Render the full record as a plain-text report.
pub fn render_record(record: &PrescriptionRecord) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Prescription Analysis Results");
    let _ = writeln!(out, "=============================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Doctor:   {}", field(&record.doctor));
    let _ = writeln!(out, "Patient:  {}", field(&record.patient));
    let _ = writeln!(out, "Date:     {}", field(&record.date));

    if !record.diagnosis.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Diagnosis:");
        for diag in &record.diagnosis {
            let _ = writeln!(out, "  - {diag}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Medications");
    let _ = writeln!(out, "-----------");

    if record.medicines.is_empty() {
        let _ = writeln!(out, "{NO_MEDICATIONS}");
        return out;
    }

    for (i, med) in record.medicines.iter().enumerate() {
        if i > 0 {
            let _ = writeln!(out);
        }
        render_medicine(&mut out, med);
    }

    out
}

fn render_medicine(out: &mut String, med: &Medicine) {
    let name = med.name.as_deref().unwrap_or("Unknown");
    let strength = med
        .strength
        .as_deref()
        .map(|s| format!(" {s}"))
        .unwrap_or_default();

    let _ = writeln!(out, "* {name}{strength}");
    let _ = writeln!(out, "    Dosage:    {}", field(&med.dosage));
    let _ = writeln!(out, "    Frequency: {}", field(&med.frequency));
    let _ = writeln!(out, "    Duration:  {}", field(&med.duration));

    if med.is_enriched() {
        let _ = writeln!(out, "    Pharmacological details:");
        if let Some(ref moa) = med.mechanism_of_action {
            let _ = writeln!(out, "      Mechanism of action: {moa}");
        }
        if let Some(ref ingredients) = med.active_ingredients {
            let _ = writeln!(out, "      Active ingredients:");
            for ing in ingredients {
                let _ = writeln!(out, "        - {ing}");
            }
        }
        if let Some(ref alternatives) = med.common_alternatives {
            let _ = writeln!(out, "      Common alternatives:");
            for alt in alternatives {
                let _ = writeln!(out, "        - {alt}");
            }
        }
    }
}

fn field(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_SPECIFIED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MedicineDetails;

    #[test]
    fn missing_fields_render_as_not_specified() {
        let record = PrescriptionRecord {
            doctor: Some("Dr. A".into()),
            ..Default::default()
        };
        let report = render_record(&record);
        assert!(report.contains("Doctor:   Dr. A"));
        assert!(report.contains("Patient:  Not specified"));
        assert!(report.contains("Date:     Not specified"));
    }

    #[test]
    fn empty_medicine_list_shows_no_medications_state() {
        let report = render_record(&PrescriptionRecord::default());
        assert!(report.contains(NO_MEDICATIONS));
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let record = PrescriptionRecord {
            patient: Some("   ".into()),
            ..Default::default()
        };
        assert!(render_record(&record).contains("Patient:  Not specified"));
    }

    #[test]
    fn enriched_medicine_renders_detail_panel() {
        let mut med = Medicine {
            name: Some("Paracetamol".into()),
            strength: Some("500mg".into()),
            ..Default::default()
        };
        med.apply_details(MedicineDetails {
            active_ingredients: vec!["paracetamol".into()],
            common_alternatives: vec!["acetaminophen".into()],
            mechanism_of_action: Some("inhibits prostaglandin synthesis".into()),
        });
        let record = PrescriptionRecord {
            medicines: vec![med],
            ..Default::default()
        };

        let report = render_record(&record);
        assert!(report.contains("* Paracetamol 500mg"));
        assert!(report.contains("Mechanism of action: inhibits prostaglandin synthesis"));
        assert!(report.contains("- acetaminophen"));
        // Primary fields absent from the parse still show placeholders.
        assert!(report.contains("Dosage:    Not specified"));
    }

    #[test]
    fn unenriched_medicine_has_no_detail_panel() {
        let record = PrescriptionRecord {
            medicines: vec![Medicine {
                name: Some("Ibuprofen".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(!render_record(&record).contains("Pharmacological details"));
    }
}
