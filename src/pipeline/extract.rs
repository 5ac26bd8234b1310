//! Text extraction: an ordered chain of strategies tried until one yields
//! usable text.
//!
//! For a PDF the chain is text layer → raster OCR; for a raster image it is
//! direct OCR only. Modelling the fallback as an explicit strategy list
//! (rather than nested conditionals) keeps the policy readable and lets
//! tests assert the order without touching pdfium or the network.
//!
//! The text-layer strategy "succeeds" only when the trimmed text exceeds
//! [`crate::config::AnalysisConfig::min_text_chars`]; a near-empty layer is
//! taken as the signature of a scanned PDF and the chain moves on. An OCR
//! error anywhere terminates extraction for the document — no partial text
//! is synthesised.

use crate::config::AnalysisConfig;
use crate::error::RxParseError;
use crate::output::TextSource;
use crate::pipeline::input::{Document, DocumentKind};
use crate::pipeline::ocr::{OcrClient, OcrSpaceClient};
use crate::pipeline::render;
use std::sync::Arc;
use tracing::{debug, info};

/// One step of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Read the PDF's embedded text layer; sufficient only above the
    /// configured length threshold.
    PdfTextLayer,
    /// Rasterise each PDF page and OCR the page images.
    RasterOcr,
    /// OCR the input image as-is.
    DirectOcr,
}

/// The ordered strategies for a document kind.
pub fn strategies_for(kind: DocumentKind) -> Vec<ExtractionStrategy> {
    match kind {
        DocumentKind::Pdf => vec![
            ExtractionStrategy::PdfTextLayer,
            ExtractionStrategy::RasterOcr,
        ],
        DocumentKind::Jpeg | DocumentKind::Png => vec![ExtractionStrategy::DirectOcr],
    }
}

/// Is a text-layer result long enough to accept without OCR?
pub fn text_layer_sufficient(text: &str, min_text_chars: usize) -> bool {
    text.trim().chars().count() > min_text_chars
}

/// Result of the extraction stage.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub source: TextSource,
    /// Page images sent to the OCR service (0 on the text-layer path).
    pub ocr_pages: usize,
}

/// Extract text from a resolved document by walking its strategy chain.
pub async fn extract_text(
    document: &Document,
    config: &AnalysisConfig,
) -> Result<Extraction, RxParseError> {
    for strategy in strategies_for(document.kind) {
        debug!("Extraction strategy: {:?}", strategy);
        if let Some(extraction) = run_strategy(strategy, document, config).await? {
            info!(
                "Extracted {} chars via {}",
                extraction.text.len(),
                extraction.source
            );
            return Ok(extraction);
        }
    }

    Err(RxParseError::ExtractionFailed {
        path: document.path.clone(),
        detail: "every extraction strategy produced an empty result".to_string(),
    })
}

/// Run one strategy. `Ok(None)` means "insufficient, try the next one";
/// errors terminate the chain.
async fn run_strategy(
    strategy: ExtractionStrategy,
    document: &Document,
    config: &AnalysisConfig,
) -> Result<Option<Extraction>, RxParseError> {
    match strategy {
        ExtractionStrategy::PdfTextLayer => {
            let text = render::extract_text_layer(&document.path).await?;
            if text_layer_sufficient(&text, config.min_text_chars) {
                Ok(Some(Extraction {
                    text,
                    source: TextSource::PdfTextLayer,
                    ocr_pages: 0,
                }))
            } else {
                debug!(
                    "Text layer too short ({} chars ≤ {}), assuming a scanned PDF",
                    text.trim().chars().count(),
                    config.min_text_chars
                );
                Ok(None)
            }
        }

        ExtractionStrategy::RasterOcr => {
            let ocr = resolve_ocr_client(config)?;
            let pages = render::render_pages(&document.path, config.ocr_dpi).await?;

            // One reused scratch path per run; each page image overwrites
            // the previous one and the directory vanishes on drop.
            let scratch = tempfile::tempdir()
                .map_err(|e| RxParseError::Internal(format!("tempdir: {e}")))?;
            let image_path = scratch.path().join("ocr_page.png");

            let mut text = String::new();
            let page_count = pages.len();
            for (idx, image) in pages {
                image
                    .save(&image_path)
                    .map_err(|e| RxParseError::RasterisationFailed {
                        page: idx + 1,
                        detail: format!("PNG encoding failed: {e}"),
                    })?;
                let page_text = ocr.recognize(&image_path).await?;
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&page_text);
            }

            if text.trim().is_empty() {
                return Ok(None);
            }
            Ok(Some(Extraction {
                text,
                source: TextSource::Ocr,
                ocr_pages: page_count,
            }))
        }

        ExtractionStrategy::DirectOcr => {
            let ocr = resolve_ocr_client(config)?;
            let text = ocr.recognize(&document.path).await?;
            if text.trim().is_empty() {
                return Ok(None);
            }
            Ok(Some(Extraction {
                text,
                source: TextSource::Ocr,
                ocr_pages: 1,
            }))
        }
    }
}

/// Use the injected OCR client, or build the real one from the environment.
///
/// Resolution is deliberately lazy: a digital PDF never reaches this point,
/// so it never needs `OCR_SPACE_API_KEY`.
fn resolve_ocr_client(config: &AnalysisConfig) -> Result<Arc<dyn OcrClient>, RxParseError> {
    if let Some(ref client) = config.ocr_client {
        return Ok(Arc::clone(client));
    }
    Ok(Arc::new(OcrSpaceClient::from_env(config.api_timeout_secs)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_chain_tries_text_layer_before_ocr() {
        assert_eq!(
            strategies_for(DocumentKind::Pdf),
            vec![
                ExtractionStrategy::PdfTextLayer,
                ExtractionStrategy::RasterOcr
            ]
        );
    }

    #[test]
    fn images_go_straight_to_ocr() {
        assert_eq!(
            strategies_for(DocumentKind::Jpeg),
            vec![ExtractionStrategy::DirectOcr]
        );
        assert_eq!(
            strategies_for(DocumentKind::Png),
            vec![ExtractionStrategy::DirectOcr]
        );
    }

    #[test]
    fn sufficiency_is_strictly_greater_than_threshold() {
        let exactly_100 = "a".repeat(100);
        assert!(!text_layer_sufficient(&exactly_100, 100));
        let over = "a".repeat(101);
        assert!(text_layer_sufficient(&over, 100));
    }

    #[test]
    fn sufficiency_ignores_surrounding_whitespace() {
        let padded = format!("\n\n  {}  \n", "a".repeat(50));
        assert!(!text_layer_sufficient(&padded, 100));
        assert!(text_layer_sufficient(&padded, 49));
    }

    #[test]
    fn empty_text_is_never_sufficient() {
        assert!(!text_layer_sufficient("", 0));
        assert!(!text_layer_sufficient("   \n  ", 0));
    }
}
