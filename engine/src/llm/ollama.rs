//! Ollama completion client
//!
//! Ollama runs models locally, typically at http://localhost:11434.
//! Requests are sent non-streaming to `/api/chat` as a single user message.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    http_client, map_transport_error, Completion, CompletionClient, CompletionError,
    CompletionRequest, Result,
};

/// Ollama client configuration
#[derive(Debug, Clone)]
pub struct OllamaClient {
    /// Base URL for Ollama API (typically http://localhost:11434)
    base_url: String,

    /// HTTP client for API requests
    client: Client,
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// # Arguments
    /// * `base_url` - Base URL for Ollama API (e.g., "http://localhost:11434")
    /// * `timeout` - Per-request timeout, covering model load and generation
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            client: http_client(timeout)?,
        })
    }

    fn build_request(&self, request: &CompletionRequest) -> OllamaRequest {
        OllamaRequest {
            model: request.model.clone(),
            messages: vec![OllamaMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let body = self.build_request(request);

        tracing::debug!(
            "Ollama request: model={}, prompt_chars={}",
            request.model,
            request.prompt.len()
        );

        let url = format!("{}/api/chat", self.base_url);
        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, &self.base_url))?;

        tracing::debug!(
            "Ollama response received in {:.1}s",
            start.elapsed().as_secs_f64()
        );

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CompletionError::ProviderUnavailable(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaResponse = response.json().await.map_err(|e| {
            CompletionError::ParseError(format!("Failed to parse Ollama response: {}", e))
        })?;

        Ok(Completion::new(
            ollama_response.message.content,
            ollama_response.model.unwrap_or_else(|| request.model.clone()),
        ))
    }
}

/// Ollama API request format
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

/// Sampling options, omitted fields fall back to the model defaults
#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Ollama message format
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

/// Ollama API response format
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    model: Option<String>,
    message: OllamaMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_client_name() {
        let client = OllamaClient::new("http://localhost:11434", Duration::from_secs(5)).unwrap();
        assert_eq!(client.name(), "ollama");
    }

    #[test]
    fn test_request_conversion() {
        let client = OllamaClient::new("http://localhost:11434", Duration::from_secs(5)).unwrap();
        let request = CompletionRequest::new("Hello", "llama3.1:8b").with_max_tokens(32);

        let body = client.build_request(&request);
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].role, "user");
        assert_eq!(body.messages[0].content, "Hello");
        assert!(!body.stream);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["options"]["num_predict"], 32);
        assert!(json["options"].get("temperature").is_none());
    }
}
