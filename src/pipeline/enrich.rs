//! Per-medicine pharmacology enrichment.
//!
//! One independent chat call per medicine, issued strictly in list order.
//! No batching, and repeated names are looked up again rather than
//! deduplicated (see DESIGN.md).
//!
//! Failures are isolated: a failed lookup leaves that medicine without
//! enrichment fields and processing continues with the next one. The
//! primary record is never invalidated by this stage.

use crate::config::AnalysisConfig;
use crate::error::{EnrichmentError, RxParseError};
use crate::pipeline::clean;
use crate::pipeline::llm::{snippet, ChatClient, ChatRequest};
use crate::prompts::{enrich_user_prompt, ENRICH_SYSTEM_PROMPT};
use crate::record::{Medicine, MedicineDetails};
use tracing::{debug, warn};

/// Outcome of enriching one medicine list in place.
#[derive(Debug, Default)]
pub struct EnrichmentSummary {
    pub enriched: usize,
    pub errors: Vec<EnrichmentError>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Enrich every medicine in `medicines`, merging details in place.
pub async fn enrich_medicines(
    client: &dyn ChatClient,
    medicines: &mut [Medicine],
    config: &AnalysisConfig,
) -> EnrichmentSummary {
    let mut summary = EnrichmentSummary::default();

    for medicine in medicines.iter_mut() {
        let Some(name) = medicine.name.clone().filter(|n| !n.trim().is_empty()) else {
            debug!("Skipping enrichment for a medicine with no name");
            continue;
        };

        match lookup_details(client, &name, config).await {
            Ok((details, prompt_tokens, completion_tokens)) => {
                medicine.apply_details(details);
                summary.prompt_tokens += prompt_tokens;
                summary.completion_tokens += completion_tokens;
                if medicine.is_enriched() {
                    summary.enriched += 1;
                }
            }
            Err(err) => {
                warn!("{err}");
                summary.errors.push(err);
            }
        }
    }

    summary
}

/// One pharmacology lookup. Maps both call and decode failures to the
/// non-fatal [`EnrichmentError`].
async fn lookup_details(
    client: &dyn ChatClient,
    name: &str,
    config: &AnalysisConfig,
) -> Result<(MedicineDetails, u64, u64), EnrichmentError> {
    let request = ChatRequest::from_config(config, ENRICH_SYSTEM_PROMPT, enrich_user_prompt(name));

    let completion =
        client
            .complete_json(&request)
            .await
            .map_err(|e| EnrichmentError::LookupFailed {
                name: name.to_string(),
                detail: flatten(e),
            })?;

    let cleaned = clean::clean_json_response(&completion.content);
    let details: MedicineDetails =
        serde_json::from_str(&cleaned).map_err(|e| EnrichmentError::InvalidJson {
            name: name.to_string(),
            detail: format!("{e} (response started with: {:?})", snippet(&completion.content)),
        })?;

    Ok((details, completion.prompt_tokens, completion.completion_tokens))
}

fn flatten(e: RxParseError) -> String {
    e.to_string().replace('\n', " ")
}
