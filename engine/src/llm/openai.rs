//! OpenAI-compatible completion client
//!
//! Talks to any `/chat/completions` endpoint that follows the OpenAI schema,
//! which covers OpenAI itself and OpenRouter.

use super::{
    http_client, map_transport_error, Completion, CompletionClient, CompletionError,
    CompletionRequest, Result,
};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

pub struct OpenAIClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            api_key,
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> super::Result<Completion> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            CompletionError::AuthenticationFailed("No API key configured".to_string())
        })?;

        let url = format!("{}/chat/completions", self.base_url);

        let mut payload = json!({
            "model": request.model,
            "messages": [{ "role": "user", "content": request.prompt }],
        });
        if let Some(temperature) = request.temperature {
            payload["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            payload["max_tokens"] = json!(max_tokens);
        }

        tracing::debug!(
            "OpenAI request: model={}, prompt_chars={}",
            request.model,
            request.prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| map_transport_error(e, &self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(CompletionError::AuthenticationFailed(text));
            } else if status.as_u16() == 429 {
                return Err(CompletionError::RateLimitExceeded);
            } else if status.is_server_error() {
                return Err(CompletionError::ProviderUnavailable(format!(
                    "OpenAI API error ({}): {}",
                    status, text
                )));
            } else {
                return Err(CompletionError::InvalidRequest(text));
            }
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CompletionError::ParseError(e.to_string()))?;

        let choice = data
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .ok_or_else(|| CompletionError::ParseError("No choices in response".to_string()))?;

        // A missing or null content is an empty completion, not a failure
        let text = choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .unwrap_or_default();

        let model = data
            .get("model")
            .and_then(|m| m.as_str())
            .unwrap_or(&request.model);

        Ok(Completion::new(text, model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_is_auth_failure() {
        let client = OpenAIClient::new("http://localhost:1", None, Duration::from_secs(1)).unwrap();

        let result = client.complete(&CompletionRequest::new("Hi", "gpt-4o-mini")).await;
        assert!(matches!(
            result,
            Err(CompletionError::AuthenticationFailed(_))
        ));
    }
}
