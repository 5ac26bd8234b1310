//! Configuration types for prescription analysis.
//!
//! All behaviour is controlled through [`AnalysisConfig`], built via its
//! [`AnalysisConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across calls, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: injected clients over ambient globals
//! The OCR and chat clients are `Arc<dyn Trait>` fields rather than
//! process-wide handles. Tests substitute deterministic fakes; production
//! callers usually leave them `None` and let the pipeline construct real
//! clients lazily from `GROQ_API_KEY` / `OCR_SPACE_API_KEY` at first use —
//! so an unsupported file or a digital PDF never needs either key.

use crate::error::RxParseError;
use crate::pipeline::llm::ChatClient;
use crate::pipeline::ocr::OcrClient;
use std::fmt;
use std::sync::Arc;

/// Default minimum length of trimmed text-layer output, in characters,
/// for a PDF to count as "digital".
///
/// Below this the document is assumed to be a scan with at most incidental
/// embedded text (a header, a watermark) and the OCR fallback runs instead.
/// The value is a heuristic with no deeper rationale, which is exactly why
/// it is a config field and not a hard-coded constant.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 100;

/// Default rasterisation resolution for the OCR fallback.
pub const DEFAULT_OCR_DPI: u32 = 300;

/// Default chat-completion model identifier.
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Configuration for one prescription analysis.
///
/// Built via [`AnalysisConfig::builder()`] or using
/// [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use rx_parse::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .min_text_chars(200)
///     .ocr_dpi(200)
///     .model("llama3-70b-8192")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Minimum trimmed text-layer length (characters) to accept a PDF as
    /// digital and skip OCR. Default: 100.
    pub min_text_chars: usize,

    /// Rasterisation DPI for the OCR fallback. Range: 72–600. Default: 300.
    ///
    /// 300 DPI is the conventional OCR sweet spot; lower values blur small
    /// handwriting, higher values inflate upload size with no accuracy gain.
    pub ocr_dpi: u32,

    /// Chat-completion model identifier. Default: `llama3-70b-8192`.
    pub model: String,

    /// Sampling temperature for both LLM calls. Default: 0.0.
    ///
    /// Extraction is transcription, not generation; determinism beats
    /// creativity here.
    pub temperature: f32,

    /// Maximum tokens the model may generate per call. Default: 2048.
    pub max_tokens: usize,

    /// Skip the per-medicine enrichment stage entirely. Default: false.
    pub skip_enrichment: bool,

    /// Pre-constructed chat client. When `None`, a Groq client is built
    /// from `GROQ_API_KEY` at the first LLM call.
    pub chat_client: Option<Arc<dyn ChatClient>>,

    /// Pre-constructed OCR client. When `None`, an OCR.Space client is
    /// built from `OCR_SPACE_API_KEY` the first time the fallback runs.
    pub ocr_client: Option<Arc<dyn OcrClient>>,

    /// Per-HTTP-call timeout in seconds (OCR and LLM). Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            ocr_dpi: DEFAULT_OCR_DPI,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_tokens: 2048,
            skip_enrichment: false,
            chat_client: None,
            ocr_client: None,
            api_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("min_text_chars", &self.min_text_chars)
            .field("ocr_dpi", &self.ocr_dpi)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("skip_enrichment", &self.skip_enrichment)
            .field("chat_client", &self.chat_client.as_ref().map(|_| "<dyn ChatClient>"))
            .field("ocr_client", &self.ocr_client.as_ref().map(|_| "<dyn OcrClient>"))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn min_text_chars(mut self, n: usize) -> Self {
        self.config.min_text_chars = n;
        self
    }

    pub fn ocr_dpi(mut self, dpi: u32) -> Self {
        self.config.ocr_dpi = dpi.clamp(72, 600);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn skip_enrichment(mut self, v: bool) -> Self {
        self.config.skip_enrichment = v;
        self
    }

    pub fn chat_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.config.chat_client = Some(client);
        self
    }

    pub fn ocr_client(mut self, client: Arc<dyn OcrClient>) -> Self {
        self.config.ocr_client = Some(client);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, RxParseError> {
        let c = &self.config;
        if c.ocr_dpi < 72 || c.ocr_dpi > 600 {
            return Err(RxParseError::InvalidConfig(format!(
                "OCR DPI must be 72–600, got {}",
                c.ocr_dpi
            )));
        }
        if c.model.trim().is_empty() {
            return Err(RxParseError::InvalidConfig(
                "Model identifier must not be empty".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(RxParseError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = AnalysisConfig::default();
        assert_eq!(c.min_text_chars, 100);
        assert_eq!(c.ocr_dpi, 300);
        assert_eq!(c.model, "llama3-70b-8192");
        assert!(!c.skip_enrichment);
    }

    #[test]
    fn builder_clamps_dpi() {
        let c = AnalysisConfig::builder().ocr_dpi(10_000).build().unwrap();
        assert_eq!(c.ocr_dpi, 600);
    }

    #[test]
    fn empty_model_rejected() {
        let mut builder = AnalysisConfig::builder();
        builder = builder.model("  ");
        assert!(builder.build().is_err());
    }

    #[test]
    fn threshold_is_configurable() {
        let c = AnalysisConfig::builder().min_text_chars(42).build().unwrap();
        assert_eq!(c.min_text_chars, 42);
    }
}
