//! Cloud OCR fallback: the `OcrClient` trait and the OCR.Space implementation.
//!
//! The service contract is a single synchronous HTTP POST per image with a
//! multipart body (the file) plus form fields `apikey`, `language=eng`,
//! `isOverlayRequired=false`, `OCREngine=2` — engine 2 is the
//! higher-accuracy variant. The JSON response carries
//! `IsErroredOnProcessing`, `ErrorMessage` and
//! `ParsedResults[0].ParsedText`.
//!
//! Failures are never retried and results are never cached; a processing
//! error surfaces the service's message verbatim.

use crate::error::RxParseError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Default OCR.Space endpoint.
pub const OCR_SPACE_ENDPOINT: &str = "https://api.ocr.space/parse/image";

/// Environment variable holding the OCR.Space API key.
pub const OCR_SPACE_API_KEY_VAR: &str = "OCR_SPACE_API_KEY";

/// A client that turns a raster image on disk into text.
///
/// Object-safe so tests can inject deterministic fakes via
/// [`crate::AnalysisConfig::ocr_client`].
#[async_trait]
pub trait OcrClient: Send + Sync {
    /// Recognise the text in the image at `image_path`.
    async fn recognize(&self, image_path: &Path) -> Result<String, RxParseError>;
}

/// OCR.Space HTTP client.
#[derive(Debug)]
pub struct OcrSpaceClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl OcrSpaceClient {
    /// Build a client for the default endpoint.
    pub fn new(api_key: impl Into<String>, timeout_secs: u64) -> Result<Self, RxParseError> {
        Self::with_endpoint(api_key, OCR_SPACE_ENDPOINT, timeout_secs)
    }

    /// Build a client for a custom endpoint (self-hosted proxy, test server).
    pub fn with_endpoint(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, RxParseError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RxParseError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a client from the `OCR_SPACE_API_KEY` environment variable.
    pub fn from_env(timeout_secs: u64) -> Result<Self, RxParseError> {
        let key = std::env::var(OCR_SPACE_API_KEY_VAR)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| RxParseError::OcrNotConfigured {
                hint: format!("Set {OCR_SPACE_API_KEY_VAR} to your OCR.Space API key."),
            })?;
        Self::new(key, timeout_secs)
    }
}

#[async_trait]
impl OcrClient for OcrSpaceClient {
    async fn recognize(&self, image_path: &Path) -> Result<String, RxParseError> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| RxParseError::Internal(format!("read {image_path:?}: {e}")))?;

        let file_name = image_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image.png")
            .to_string();

        debug!("OCR upload: {} ({} bytes)", file_name, bytes.len());

        let form = reqwest::multipart::Form::new()
            .text("apikey", self.api_key.clone())
            .text("language", "eng")
            .text("isOverlayRequired", "false")
            .text("OCREngine", "2")
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RxParseError::OcrRequestFailed {
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RxParseError::OcrRequestFailed {
                detail: format!("HTTP {status}: {body}"),
            });
        }

        let body: OcrSpaceResponse =
            response
                .json()
                .await
                .map_err(|e| RxParseError::OcrRequestFailed {
                    detail: format!("invalid response body: {e}"),
                })?;

        parse_ocr_response(body)
    }
}

/// Interpret a decoded OCR.Space response body.
///
/// Split out of the HTTP call so the error paths are unit-testable
/// without a network.
fn parse_ocr_response(body: OcrSpaceResponse) -> Result<String, RxParseError> {
    if body.is_errored_on_processing {
        let message = body
            .error_message
            .map(|m| m.joined())
            .unwrap_or_else(|| "unspecified processing error".to_string());
        warn!("OCR service reported a processing error: {message}");
        return Err(RxParseError::OcrProcessingError { message });
    }

    body.parsed_results
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(|r| r.parsed_text)
        .ok_or_else(|| RxParseError::OcrRequestFailed {
            detail: "response contained no parsed results".to_string(),
        })
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<ErrorMessage>,
    #[serde(default)]
    parsed_results: Option<Vec<OcrParsedResult>>,
}

/// OCR.Space returns `ErrorMessage` as either a string or an array of
/// strings depending on the failure.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn joined(self) -> String {
        match self {
            ErrorMessage::One(s) => s,
            ErrorMessage::Many(v) => v.join("; "),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrParsedResult {
    #[serde(default)]
    parsed_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_response_yields_first_parsed_text() {
        let body: OcrSpaceResponse = serde_json::from_str(
            r#"{
                "IsErroredOnProcessing": false,
                "ParsedResults": [
                    {"ParsedText": "Rx Amoxicillin 250mg"},
                    {"ParsedText": "ignored second result"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(parse_ocr_response(body).unwrap(), "Rx Amoxicillin 250mg");
    }

    #[test]
    fn processing_error_surfaces_message_verbatim() {
        let body: OcrSpaceResponse = serde_json::from_str(
            r#"{"IsErroredOnProcessing": true, "ErrorMessage": "bad image"}"#,
        )
        .unwrap();
        let err = parse_ocr_response(body).unwrap_err();
        match err {
            RxParseError::OcrProcessingError { message } => assert_eq!(message, "bad image"),
            other => panic!("expected OcrProcessingError, got {other:?}"),
        }
    }

    #[test]
    fn error_message_array_is_joined() {
        let body: OcrSpaceResponse = serde_json::from_str(
            r#"{"IsErroredOnProcessing": true, "ErrorMessage": ["bad image", "try again"]}"#,
        )
        .unwrap();
        let err = parse_ocr_response(body).unwrap_err();
        assert!(err.to_string().contains("bad image; try again"));
    }

    #[test]
    fn missing_parsed_results_is_a_request_failure() {
        let body: OcrSpaceResponse =
            serde_json::from_str(r#"{"IsErroredOnProcessing": false}"#).unwrap();
        let err = parse_ocr_response(body).unwrap_err();
        assert!(matches!(err, RxParseError::OcrRequestFailed { .. }));
    }

    #[test]
    fn from_env_without_key_is_not_configured() {
        // Serialise access to the env var across tests in this module.
        std::env::remove_var("OCR_SPACE_API_KEY");
        let err = OcrSpaceClient::from_env(5).unwrap_err();
        assert!(matches!(err, RxParseError::OcrNotConfigured { .. }));
    }
}
