//! Top-level analysis entry points.
//!
//! One document flows through the stages strictly sequentially: resolve →
//! extract → parse → enrich. There is no queuing, no concurrency between
//! stages, and no retry — a failed stage terminates the run with a typed
//! error and the caller decides how to surface it.

use crate::config::AnalysisConfig;
use crate::error::RxParseError;
use crate::output::{AnalysisOutput, AnalysisStats};
use crate::pipeline::enrich::enrich_medicines;
use crate::pipeline::extract::extract_text;
use crate::pipeline::input::resolve_document;
use crate::pipeline::llm::{parse_prescription, ChatClient, GroqClient};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Analyse a prescription document (PDF, JPG/JPEG or PNG).
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input_path` — path to the document on disk
/// * `config` — analysis configuration
///
/// # Returns
/// `Ok(AnalysisOutput)` on success, even if some medicines failed to
/// enrich (check `output.enrichment_errors`).
///
/// # Errors
/// Returns `Err(RxParseError)` for fatal failures:
/// - File not found / permission denied / unsupported format
/// - Every extraction strategy produced nothing
/// - The primary LLM call failed or returned non-JSON
pub async fn analyze(
    input_path: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, RxParseError> {
    let total_start = Instant::now();
    let input_path = input_path.as_ref();
    info!("Starting analysis: {}", input_path);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let document = resolve_document(input_path)?;

    // ── Step 2: Extract text ─────────────────────────────────────────────
    let extraction_start = Instant::now();
    let extraction = extract_text(&document, config).await?;
    let extraction_duration_ms = extraction_start.elapsed().as_millis() as u64;

    // ── Step 3: Primary structured extraction ────────────────────────────
    let chat = resolve_chat_client(config)?;
    let llm_start = Instant::now();
    let (mut record, completion) =
        parse_prescription(chat.as_ref(), &extraction.text, config).await?;
    let medicines_found = record.medicines.len();
    info!(
        "Primary parse found {} medicines, {} diagnosis lines",
        medicines_found,
        record.diagnosis.len()
    );

    // ── Step 4: Per-medicine enrichment ──────────────────────────────────
    let mut total_input_tokens = completion.prompt_tokens;
    let mut total_output_tokens = completion.completion_tokens;

    let (medicines_enriched, enrichment_errors) = if config.skip_enrichment {
        debug!("Enrichment disabled by config");
        (0, Vec::new())
    } else {
        let summary = enrich_medicines(chat.as_ref(), &mut record.medicines, config).await;
        total_input_tokens += summary.prompt_tokens;
        total_output_tokens += summary.completion_tokens;
        (summary.enriched, summary.errors)
    };
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    // ── Step 5: Assemble output ──────────────────────────────────────────
    let stats = AnalysisStats {
        text_source: extraction.source,
        ocr_pages: extraction.ocr_pages,
        extracted_chars: extraction.text.chars().count(),
        medicines_found,
        medicines_enriched,
        enrichment_failures: enrichment_errors.len(),
        total_input_tokens,
        total_output_tokens,
        extraction_duration_ms,
        llm_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Analysis complete: {}/{} medicines enriched, {}ms total",
        medicines_enriched, medicines_found, stats.total_duration_ms
    );

    Ok(AnalysisOutput {
        record,
        extracted_text: extraction.text,
        stats,
        enrichment_errors,
    })
}

/// Analyse a document and write the enriched record to a JSON file.
///
/// The file holds exactly the [`crate::record::PrescriptionRecord`]
/// structure with 2-space indentation. Uses atomic write (temp file +
/// rename) to prevent partial files.
pub async fn analyze_to_file(
    input_path: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, RxParseError> {
    let output = analyze(input_path, config).await?;
    let path = output_path.as_ref();

    let json = serde_json::to_string_pretty(&output.record)
        .map_err(|e| RxParseError::Internal(format!("record serialisation: {e}")))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                RxParseError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &json)
        .await
        .map_err(|e| RxParseError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| RxParseError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output)
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    input_path: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, RxParseError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| RxParseError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(analyze(input_path, config))
}

/// Run only the extraction stage and return the raw text.
///
/// Does not require an LLM key; needs the OCR key only when the fallback
/// actually runs. Useful for checking what the models will see.
pub async fn extract_only(
    input_path: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<String, RxParseError> {
    let document = resolve_document(input_path.as_ref())?;
    let extraction = extract_text(&document, config).await?;
    Ok(extraction.text)
}

/// Use the injected chat client, or build a Groq client from `GROQ_API_KEY`.
fn resolve_chat_client(config: &AnalysisConfig) -> Result<Arc<dyn ChatClient>, RxParseError> {
    if let Some(ref client) = config.chat_client {
        return Ok(Arc::clone(client));
    }
    Ok(Arc::new(GroqClient::from_env(config.api_timeout_secs)?))
}
