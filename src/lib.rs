//! # rx-parse
//!
//! Extract structured prescription data from PDFs and scanned images.
//!
//! ## Why this crate?
//!
//! Prescriptions arrive as digital PDFs, scanned PDFs, and phone photos.
//! No single extraction path covers all three: a digital PDF has a perfect
//! text layer, a scan needs OCR, and only a language model reliably turns
//! the messy result into structured fields. This crate chains the three —
//! local text layer first, cloud OCR as fallback, then an LLM parse with a
//! per-medicine pharmacology lookup on top.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document (PDF / JPG / PNG)
//!  │
//!  ├─ 1. Input    classify by extension, validate the file
//!  ├─ 2. Extract  PDF text layer if long enough, else rasterise + OCR;
//!  │              images go straight to OCR
//!  ├─ 3. Parse    one chat-completion call → PrescriptionRecord (JSON)
//!  ├─ 4. Enrich   one lookup per medicine (active ingredients,
//!  │              alternatives, mechanism of action), failures isolated
//!  └─ 5. Output   record + stats; JSON export with 2-space indentation
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rx_parse::{analyze, AnalysisConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Clients built from GROQ_API_KEY / OCR_SPACE_API_KEY at first use.
//!     let config = AnalysisConfig::default();
//!     let output = analyze("prescription.pdf", &config).await?;
//!     println!("{}", serde_json::to_string_pretty(&output.record)?);
//!     eprintln!("tokens: {} in / {} out",
//!         output.stats.total_input_tokens,
//!         output.stats.total_output_tokens);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `rxparse` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! rx-parse = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod record;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, analyze_sync, analyze_to_file, extract_only};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, DEFAULT_MIN_TEXT_CHARS, DEFAULT_MODEL, DEFAULT_OCR_DPI};
pub use error::{EnrichmentError, RxParseError};
pub use output::{AnalysisOutput, AnalysisStats, TextSource};
pub use pipeline::llm::{ChatClient, ChatCompletion, ChatRequest, GroqClient};
pub use pipeline::ocr::{OcrClient, OcrSpaceClient};
pub use record::{Medicine, MedicineDetails, PrescriptionRecord};
