use crate::config::AiConfig;
use crate::eeat::prompt::{build_prompt, parse_assessment};
use crate::eeat::{ClassifierError, EeatAssessment, EeatClassifier, EeatRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Longest error body kept in a [`ClassifierError::Status`]
const MAX_ERROR_BODY: usize = 300;

/// E-E-A-T classifier backed by the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct AnthropicClassifier {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClassifier {
    /// Creates a classifier with an explicit API key
    pub fn new(client: Client, config: &AiConfig, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: api_key.into(),
            api_version: config.api_version.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Creates a classifier, reading the API key from the configured
    /// environment variable
    pub fn from_env(client: Client, config: &AiConfig) -> Result<Self, ClassifierError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ClassifierError::MissingApiKey(config.api_key_env.clone()))?;
        Ok(Self::new(client, config, api_key))
    }
}

#[async_trait]
impl EeatClassifier for AnthropicClassifier {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn classify(&self, request: &EeatRequest) -> Result<EeatAssessment, ClassifierError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [Message {
                role: "user",
                content: build_prompt(request),
            }],
        };

        debug!("Requesting E-E-A-T assessment for {}", request.url);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        let reply = parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| {
                ClassifierError::InvalidResponse("no text content in reply".to_string())
            })?;

        parse_assessment(&reply)
    }
}

fn map_transport_error(err: reqwest::Error) -> ClassifierError {
    if err.is_timeout() {
        ClassifierError::Timeout
    } else {
        ClassifierError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_without_key() {
        let config = AiConfig {
            api_key_env: "SEO_AUDIT_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..AiConfig::default()
        };
        let err = AnthropicClassifier::from_env(Client::new(), &config).unwrap_err();
        assert_eq!(
            err,
            ClassifierError::MissingApiKey("SEO_AUDIT_TEST_KEY_THAT_IS_NEVER_SET".to_string())
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = MessagesRequest {
            model: "claude-3-5-haiku-latest",
            max_tokens: 1024,
            messages: [Message {
                role: "user",
                content: "hello".to_string(),
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "claude-3-5-haiku-latest");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }
}
