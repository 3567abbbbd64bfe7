//! Completion Client Abstraction Layer
//!
//! The optimizer consumes the language model as an opaque capability: a single
//! plain-text prompt plus a model name and sampling parameters goes in, generated
//! text comes out. The `CompletionClient` trait is that contract; the concrete
//! clients in this module speak the OpenAI-compatible chat API (OpenAI,
//! OpenRouter) and the Ollama chat API.
//!
//! Clients never retry. Timeouts are enforced by the HTTP client itself.

use async_trait::async_trait;
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{LLMConfig, ProviderKind};

#[cfg(test)]
pub(crate) mod mock;
pub mod ollama;
pub mod openai;

pub use sdk::errors::CompletionError;

/// Result type for completion calls
pub type Result<T> = std::result::Result<T, CompletionError>;

/// Default sampling temperature used by every engine prompt
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default completion length used by every engine prompt
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The full prompt, sent as one user message
    pub prompt: String,

    /// Model identifier understood by the provider
    pub model: String,

    /// Sampling temperature, provider default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Maximum generated tokens, provider default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Create a request with no sampling overrides
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Generated text and the model that actually served it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub model: String,
}

impl Completion {
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
        }
    }
}

/// Model and sampling parameters shared by a set of prompts
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl ModelSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Build a request for `prompt` using these settings
    pub fn request(&self, prompt: impl Into<String>) -> CompletionRequest {
        CompletionRequest::new(prompt, self.model.clone())
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

impl From<&LLMConfig> for ModelSettings {
    fn from(config: &LLMConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Completion client trait that all providers must implement
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the name of the provider (e.g., "openai", "ollama")
    fn name(&self) -> &str;

    /// Run a single completion
    ///
    /// # Returns
    /// * `Ok(Completion)` - Generated text and serving model
    /// * `Err(CompletionError)` - Non-2xx status, network failure or malformed body
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}

/// Build the configured completion client
pub fn build_client(config: &LLMConfig) -> std::result::Result<Arc<dyn CompletionClient>, EngineError> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let client: Arc<dyn CompletionClient> = match config.provider {
        ProviderKind::OpenAI => {
            let api_key = std::env::var(&config.openai.api_key_env).ok();
            if api_key.is_none() {
                tracing::warn!(
                    "{} is not set; completion calls will be rejected by the provider",
                    config.openai.api_key_env
                );
            }
            Arc::new(
                openai::OpenAIClient::new(config.openai.base_url.clone(), api_key, timeout)
                    .map_err(|e| EngineError::Config(e.to_string()))?,
            )
        }
        ProviderKind::Ollama => Arc::new(
            ollama::OllamaClient::new(config.ollama.base_url.clone(), timeout)
                .map_err(|e| EngineError::Config(e.to_string()))?,
        ),
    };

    tracing::debug!("Using completion provider: {}", client.name());
    Ok(client)
}

/// HTTP client carrying the per-request deadline
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CompletionError::NetworkError(format!("Failed to create HTTP client: {}", e)))
}

/// Map a reqwest transport error to a completion error
pub(crate) fn map_transport_error(err: reqwest::Error, base_url: &str) -> CompletionError {
    if err.is_timeout() {
        CompletionError::Timeout
    } else if err.is_connect() {
        CompletionError::ProviderUnavailable(format!("Cannot connect to {}", base_url))
    } else {
        CompletionError::NetworkError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("Hello", "gpt-4o-mini")
            .with_temperature(0.2)
            .with_max_tokens(64);
        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(64));
    }

    #[test]
    fn test_model_settings_defaults() {
        let settings = ModelSettings::new("llama3.1:8b");
        let request = settings.request("Hi");
        assert_eq!(request.model, "llama3.1:8b");
        assert_eq!(request.temperature, Some(DEFAULT_TEMPERATURE));
        assert_eq!(request.max_tokens, Some(DEFAULT_MAX_TOKENS));
    }

    #[test]
    fn test_request_omits_unset_sampling() {
        let json = serde_json::to_string(&CompletionRequest::new("p", "m")).unwrap();
        assert!(!json.contains("temperature"));
        assert!(!json.contains("max_tokens"));
    }

    #[test]
    fn test_build_client_by_provider() {
        let mut config = LLMConfig::default();
        config.provider = ProviderKind::Ollama;
        let client = build_client(&config).unwrap();
        assert_eq!(client.name(), "ollama");

        config.provider = ProviderKind::OpenAI;
        let client = build_client(&config).unwrap();
        assert_eq!(client.name(), "openai");
    }
}
