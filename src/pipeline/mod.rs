//! Pipeline stages for prescription analysis.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different OCR backend) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ llm ──▶ enrich
//! (kind)    (text layer  (parse   (per-medicine
//!            or OCR)      JSON)    lookups)
//! ```
//!
//! 1. [`input`]   — classify the file by extension and validate the path
//! 2. [`extract`] — walk the ordered strategy chain (text layer → OCR for
//!    PDFs, direct OCR for images); pdfium work via [`render`], cloud OCR
//!    via [`ocr`]
//! 3. [`llm`]     — one chat call turning the text into a
//!    `PrescriptionRecord`; responses pass through [`clean`] first
//! 4. [`enrich`]  — sequential per-medicine pharmacology lookups with
//!    isolated failures

pub mod clean;
pub mod enrich;
pub mod extract;
pub mod input;
pub mod llm;
pub mod ocr;
pub mod render;
