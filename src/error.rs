//! Error types for the rx-parse library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`RxParseError`] — **Fatal**: the analysis cannot proceed at all
//!   (unsupported file kind, extraction produced nothing, the primary LLM
//!   call failed). Returned as `Err(RxParseError)` from the top-level
//!   `analyze*` functions.
//!
//! * [`EnrichmentError`] — **Non-fatal**: one medicine's pharmacology lookup
//!   failed but the primary record and every other medicine are fine. Stored
//!   inside [`crate::output::AnalysisOutput`] so callers can inspect partial
//!   success rather than losing the whole record to one bad lookup.
//!
//! The separation keeps the extraction/LLM logic UI-agnostic: stages return
//! typed values and the caller alone decides how to surface them.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the rx-parse library.
///
/// Per-medicine enrichment failures use [`EnrichmentError`] and are stored
/// in [`crate::output::AnalysisOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum RxParseError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file extension is not one of pdf / jpg / jpeg / png.
    #[error(
        "Unsupported file format for '{path}' (extension: {extension:?})\n\
         Supported kinds: PDF, JPG/JPEG, PNG."
    )]
    UnsupportedFormat {
        path: PathBuf,
        extension: Option<String>,
    },

    /// The file claims to be a PDF but lacks the `%PDF` magic bytes.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
         Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy."
    )]
    PdfiumBindingFailed(String),

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Every extraction strategy produced an empty result.
    #[error("Could not extract any text from '{path}': {detail}")]
    ExtractionFailed { path: PathBuf, detail: String },

    /// The OCR service could not be reached, or answered with a non-success
    /// HTTP status.
    #[error("OCR request failed: {detail}")]
    OcrRequestFailed { detail: String },

    /// The OCR service answered 200 but reported a processing error.
    ///
    /// `message` carries the service's `ErrorMessage` verbatim.
    #[error("OCR processing error: {message}")]
    OcrProcessingError { message: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// No chat client was injected and the API key env var is missing.
    #[error("LLM client is not configured.\n{hint}")]
    LlmNotConfigured { hint: String },

    /// No OCR client was injected and the API key env var is missing.
    #[error("OCR client is not configured.\n{hint}")]
    OcrNotConfigured { hint: String },

    /// The chat-completion API returned an error or could not be reached.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The LLM response body was not valid JSON.
    #[error("LLM response is not valid JSON: {detail}\nResponse started with: {snippet:?}")]
    JsonDecodeFailed { detail: String, snippet: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the exported JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single medicine's enrichment lookup.
///
/// Stored in [`crate::output::AnalysisOutput`] when a lookup fails. The
/// analysis continues with the next medicine and the primary record is
/// never invalidated.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum EnrichmentError {
    /// The secondary chat-completion call failed.
    #[error("Medicine '{name}': pharmacology lookup failed: {detail}")]
    LookupFailed { name: String, detail: String },

    /// The lookup answered, but the body was not valid JSON.
    #[error("Medicine '{name}': lookup response is not valid JSON: {detail}")]
    InvalidJson { name: String, detail: String },
}

impl EnrichmentError {
    /// The medicine name this error belongs to.
    pub fn medicine_name(&self) -> &str {
        match self {
            EnrichmentError::LookupFailed { name, .. } => name,
            EnrichmentError::InvalidJson { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_display() {
        let e = RxParseError::UnsupportedFormat {
            path: PathBuf::from("scan.tiff"),
            extension: Some("tiff".into()),
        };
        let msg = e.to_string();
        assert!(msg.contains("scan.tiff"), "got: {msg}");
        assert!(msg.contains("tiff"));
    }

    #[test]
    fn ocr_processing_error_carries_message_verbatim() {
        let e = RxParseError::OcrProcessingError {
            message: "bad image".into(),
        };
        assert!(e.to_string().contains("bad image"));
    }

    #[test]
    fn json_decode_display() {
        let e = RxParseError::JsonDecodeFailed {
            detail: "expected value at line 1".into(),
            snippet: "Sure! Here is".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("expected value"));
        assert!(msg.contains("Sure! Here is"));
    }

    #[test]
    fn enrichment_error_name() {
        let e = EnrichmentError::LookupFailed {
            name: "Paracetamol".into(),
            detail: "timeout".into(),
        };
        assert_eq!(e.medicine_name(), "Paracetamol");
        assert!(e.to_string().contains("Paracetamol"));
    }
}
