//! Chat-completion interaction: the `ChatClient` trait, the Groq-hosted
//! implementation, and the primary structured-extraction call.
//!
//! Both LLM stages (prescription parse and per-medicine lookup) go through
//! the same `complete_json` entry point; they differ only in prompt
//! content. All prompt text lives in [`crate::prompts`] so it can change
//! without touching request or error-handling logic here.
//!
//! Calls are synchronous from the pipeline's point of view and are never
//! retried: a failed call surfaces its message and the stage produces an
//! absent result.

use crate::config::AnalysisConfig;
use crate::error::RxParseError;
use crate::pipeline::clean;
use crate::prompts::{parse_user_prompt, PARSE_SYSTEM_PROMPT};
use crate::record::PrescriptionRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Groq OpenAI-compatible chat-completions endpoint.
pub const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Environment variable holding the Groq API key.
pub const GROQ_API_KEY_VAR: &str = "GROQ_API_KEY";

/// One chat-completion request constrained to JSON output.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

impl ChatRequest {
    /// Build a request from the config with the given prompt pair.
    pub fn from_config(config: &AnalysisConfig, system: &str, user: String) -> Self {
        Self {
            model: config.model.clone(),
            system: system.to_string(),
            user,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// A completed chat call: the raw content plus token usage for stats.
#[derive(Debug, Clone, Default)]
pub struct ChatCompletion {
    pub content: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// A client that answers a chat request with a JSON-only completion.
///
/// Object-safe so tests can inject deterministic fakes via
/// [`crate::AnalysisConfig::chat_client`].
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete_json(&self, request: &ChatRequest) -> Result<ChatCompletion, RxParseError>;
}

/// Groq-hosted chat-completion client (OpenAI-compatible wire format).
pub struct GroqClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GroqClient {
    pub fn new(api_key: impl Into<String>, timeout_secs: u64) -> Result<Self, RxParseError> {
        Self::with_endpoint(api_key, GROQ_ENDPOINT, timeout_secs)
    }

    /// Build a client for a custom OpenAI-compatible endpoint.
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

    /// Build a client from the `GROQ_API_KEY` environment variable.
    pub fn from_env(timeout_secs: u64) -> Result<Self, RxParseError> {
        let key = std::env::var(GROQ_API_KEY_VAR)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| RxParseError::LlmNotConfigured {
                hint: format!("Set {GROQ_API_KEY_VAR} to your Groq API key."),
            })?;
        Self::new(key, timeout_secs)
    }
}

#[async_trait]
impl ChatClient for GroqClient {
    async fn complete_json(&self, request: &ChatRequest) -> Result<ChatCompletion, RxParseError> {
        let body = CompletionsRequest {
            model: &request.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &request.system,
                },
                WireMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RxParseError::LlmApiError {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RxParseError::LlmApiError {
                message: format!("HTTP {status}: {body}"),
            });
        }

        let decoded: CompletionsResponse =
            response.json().await.map_err(|e| RxParseError::LlmApiError {
                message: format!("invalid response body: {e}"),
            })?;

        let content = decoded
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| RxParseError::LlmApiError {
                message: "response contained no choices".to_string(),
            })?;

        let usage = decoded.usage.unwrap_or_default();
        debug!(
            "chat completion: {} prompt / {} completion tokens",
            usage.prompt_tokens, usage.completion_tokens
        );

        Ok(ChatCompletion {
            content,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        })
    }
}

/// Run the primary structured-extraction call over the full extracted text.
///
/// The response is cleaned ([`clean::clean_json_response`]) and then parsed
/// as a [`PrescriptionRecord`]; no validation beyond JSON-parseability is
/// performed — every field is optional downstream.
pub async fn parse_prescription(
    client: &dyn ChatClient,
    text: &str,
    config: &AnalysisConfig,
) -> Result<(PrescriptionRecord, ChatCompletion), RxParseError> {
    let request = ChatRequest::from_config(config, PARSE_SYSTEM_PROMPT, parse_user_prompt(text));
    let completion = client.complete_json(&request).await?;

    let cleaned = clean::clean_json_response(&completion.content);
    let record: PrescriptionRecord =
        serde_json::from_str(&cleaned).map_err(|e| RxParseError::JsonDecodeFailed {
            detail: e.to_string(),
            snippet: snippet(&completion.content),
        })?;

    Ok((record, completion))
}

/// First few characters of a bad response, for error messages.
pub(crate) fn snippet(content: &str) -> String {
    content.chars().take(80).collect()
}

// ── Wire types (OpenAI-compatible) ───────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionsResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_serialises_to_openai_wire_format() {
        let body = CompletionsRequest {
            model: "llama3-70b-8192",
            messages: vec![
                WireMessage {
                    role: "system",
                    content: "sys",
                },
                WireMessage {
                    role: "user",
                    content: "usr",
                },
            ],
            temperature: 0.0,
            max_tokens: 2048,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama3-70b-8192");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[test]
    fn completions_response_decodes_choices_and_usage() {
        let decoded: CompletionsResponse = serde_json::from_str(
            r#"{
                "choices": [{"message": {"role": "assistant", "content": "{\"doctor\":\"Dr. A\"}"}}],
                "usage": {"prompt_tokens": 120, "completion_tokens": 34}
            }"#,
        )
        .unwrap();
        assert_eq!(decoded.choices[0].message.content, r#"{"doctor":"Dr. A"}"#);
        assert_eq!(decoded.usage.unwrap().prompt_tokens, 120);
    }

    #[test]
    fn snippet_truncates_long_content() {
        let long = "x".repeat(500);
        assert_eq!(snippet(&long).len(), 80);
    }
}
