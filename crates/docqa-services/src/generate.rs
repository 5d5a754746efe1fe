//! Text generation client (query rewriting).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docqa_core::{EndpointConfig, QaError, Result, TextGenerator};

/// OpenAI-compatible chat completion request.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for an OpenAI-compatible chat completion endpoint.
pub struct HttpTextGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpTextGenerator {
    /// Create a new client from endpoint configuration.
    pub fn new(config: &EndpointConfig, timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QaError::generation(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone().unwrap_or_else(|| "gpt-4o-mini".to_string()),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.endpoint);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        debug!("Generation request to {}", url);

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| QaError::generation(format!("Request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| QaError::generation(format!("Service returned error: {}", e)))?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| QaError::generation(format!("Malformed response: {}", e)))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| QaError::generation("Response contained no choices"))?;

        Ok(text)
    }
}

/// Deterministic generator for tests: returns a canned reply or always fails.
pub struct MockTextGenerator {
    reply: Option<String>,
}

impl MockTextGenerator {
    /// Always respond with the given text.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
        }
    }

    /// Always fail, for exercising the rewrite fallback.
    pub fn failing() -> Self {
        Self { reply: None }
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(QaError::generation("mock generator configured to fail")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replying() {
        let generator = MockTextGenerator::replying("expanded query");
        assert_eq!(generator.generate("prompt").await.unwrap(), "expanded query");
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let generator = MockTextGenerator::failing();
        assert!(generator.generate("prompt").await.is_err());
    }

    #[test]
    fn test_chat_response_parsing() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"rewritten"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "rewritten");
    }
}
