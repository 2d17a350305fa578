//! Minimal Anthropic Messages API client shared by the script and topic
//! generators.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{require_key, AnthropicConfig};
use crate::error::{WorkerError, WorkerResult};

pub(crate) const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Extracts the body of a fenced code block.
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("code fence pattern is valid")
});

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Single-turn completion client. Failures are reported through `error`,
/// so each caller keeps its own error kind.
pub(crate) struct MessagesClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    error: fn(String) -> WorkerError,
}

impl MessagesClient {
    pub(crate) fn new(
        config: &AnthropicConfig,
        error: fn(String) -> WorkerError,
    ) -> WorkerResult<Self> {
        let api_key = require_key(&config.api_key, "ANTHROPIC_API_KEY")?.to_string();
        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            error,
        })
    }

    pub(crate) fn model(&self) -> &str {
        &self.model
    }

    /// Send `prompt` as one user message and return the first text block.
    pub(crate) async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> WorkerResult<String> {
        let url = format!("{}/v1/messages", self.base_url);
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| (self.error)(format!("Anthropic API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err((self.error)(format!(
                "Anthropic API returned {}: {}",
                status, error_text
            )));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| (self.error)(format!("Failed to parse Anthropic response: {}", e)))?;

        body.content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| (self.error)("No text content in Anthropic response".to_string()))
    }
}

/// The body of the first fenced code block in `text`, or the trimmed text
/// when there is none.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    CODE_FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(text, |m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  [1, 2] "), "[1, 2]");
        assert_eq!(strip_code_fence("Sure:\n```json\n[1]\n```\nbye"), "[1]");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
    }

    #[test]
    fn test_temperature_omitted_when_unset() {
        let request = MessagesRequest {
            model: "m",
            max_tokens: 10,
            temperature: None,
            messages: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("temperature").is_none());
    }
}
