//! Result types returned by the top-level `analyze*` functions.

use crate::error::EnrichmentError;
use crate::record::PrescriptionRecord;
use serde::{Deserialize, Serialize};

/// Full result of analysing one prescription document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    /// The structured record, with enrichment fields merged in where the
    /// per-medicine lookups succeeded.
    pub record: PrescriptionRecord,

    /// The plain text the record was extracted from. Useful for debugging
    /// a bad parse and for the CLI's `--show-text` view.
    pub extracted_text: String,

    /// Timings, token usage and per-stage counters.
    pub stats: AnalysisStats,

    /// Non-fatal per-medicine enrichment failures, in medicine-list order.
    /// Empty when every lookup succeeded (or enrichment was disabled).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enrichment_errors: Vec<EnrichmentError>,
}

/// Which extraction strategy produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextSource {
    /// The PDF's embedded text layer was long enough to accept.
    PdfTextLayer,
    /// Pages were rasterised and sent to the OCR service.
    Ocr,
}

impl std::fmt::Display for TextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextSource::PdfTextLayer => write!(f, "pdf text layer"),
            TextSource::Ocr => write!(f, "ocr"),
        }
    }
}

/// Counters and timings for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Which strategy won the extraction stage.
    pub text_source: TextSource,

    /// Number of page images sent to the OCR service (0 on the text-layer
    /// path and for digital PDFs).
    pub ocr_pages: usize,

    /// Characters of extracted text handed to the primary LLM call.
    pub extracted_chars: usize,

    /// Medicines found by the primary call.
    pub medicines_found: usize,

    /// Medicines successfully enriched.
    pub medicines_enriched: usize,

    /// Enrichment lookups that failed (see `enrichment_errors`).
    pub enrichment_failures: usize,

    /// Prompt tokens across the primary call and every lookup.
    pub total_input_tokens: u64,

    /// Completion tokens across the primary call and every lookup.
    pub total_output_tokens: u64,

    /// Wall-clock duration of the extraction stage (text layer, and OCR
    /// when the fallback ran).
    pub extraction_duration_ms: u64,

    /// Wall-clock duration of both LLM stages combined.
    pub llm_duration_ms: u64,

    /// End-to-end duration.
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_source_display() {
        assert_eq!(TextSource::PdfTextLayer.to_string(), "pdf text layer");
        assert_eq!(TextSource::Ocr.to_string(), "ocr");
    }

    #[test]
    fn output_without_enrichment_errors_omits_the_key() {
        let out = AnalysisOutput {
            record: PrescriptionRecord::default(),
            extracted_text: "Rx".into(),
            stats: AnalysisStats {
                text_source: TextSource::Ocr,
                ocr_pages: 1,
                extracted_chars: 2,
                medicines_found: 0,
                medicines_enriched: 0,
                enrichment_failures: 0,
                total_input_tokens: 10,
                total_output_tokens: 5,
                extraction_duration_ms: 1,
                llm_duration_ms: 1,
                total_duration_ms: 2,
            },
            enrichment_errors: vec![],
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(!json.contains("enrichment_errors"));
    }
}
