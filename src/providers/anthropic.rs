use async_trait::async_trait;
use log::warn;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::language_rules::few_shot_examples;

use super::http::{build_client, join_url, send_with_retry, RetryPolicy};
use super::{CorrectionProvider, SamplingConfig};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic messages API
#[derive(Debug)]
pub struct Anthropic {
    client: Client,
    api_key: String,
    /// API endpoint URL
    endpoint: String,
    /// Retry behaviour
    retry: RetryPolicy,
}

/// Body of a `v1/messages` call
#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    // Instructions travel in the top-level system field, not as a message
    system: &'a str,
    messages: Vec<MessageTurn<'a>>,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

/// One conversation turn
#[derive(Debug, Serialize)]
pub struct MessageTurn<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Messages API answer
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// Content block; only `text` blocks carry the answer
#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

impl Anthropic {
    /// Client for `endpoint`, or the public API when empty
    pub fn new(api_key: &str, endpoint: &str, retry: RetryPolicy) -> Result<Self, ProviderError> {
        let endpoint = if endpoint.is_empty() {
            "https://api.anthropic.com".to_string()
        } else {
            endpoint.to_string()
        };

        Ok(Self {
            client: build_client()?,
            api_key: api_key.to_string(),
            endpoint,
            retry,
        })
    }

    /// Build the full request for a correction
    pub fn build_request<'a>(text: &'a str, instructions: &'a str, sampling: &'a SamplingConfig) -> MessagesRequest<'a> {
        let mut messages: Vec<MessageTurn<'a>> = few_shot_examples()
            .into_iter()
            .flat_map(|example| {
                [
                    MessageTurn { role: "user", content: example.input },
                    MessageTurn { role: "assistant", content: example.output },
                ]
            })
            .collect();
        messages.push(MessageTurn { role: "user", content: text });

        MessagesRequest {
            model: &sampling.model,
            max_tokens: sampling.max_output_tokens,
            system: instructions,
            messages,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            top_k: sampling.top_k,
        }
    }

    /// Post a messages request
    pub async fn complete(&self, request: &MessagesRequest<'_>) -> Result<MessagesResponse, ProviderError> {
        let url = join_url(&self.endpoint, "v1/messages")?;

        send_with_retry("anthropic", &self.retry, || {
            self.client
                .post(url.clone())
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(request)
        })
        .await
    }

    /// Concatenated text blocks of the answer
    pub fn extract_text_from_response(response: &MessagesResponse) -> Result<String, ProviderError> {
        let text: String = response
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        if response.stop_reason.as_deref() == Some("max_tokens") {
            warn!("Anthropic answer was cut at max_tokens, segments may be missing");
        }
        Ok(text)
    }
}

#[async_trait]
impl CorrectionProvider for Anthropic {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn correct(
        &self,
        text: &str,
        instructions: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, ProviderError> {
        let request = Self::build_request(text, instructions, sampling);
        let response = self.complete(&request).await?;
        Self::extract_text_from_response(&response)
    }

    // Listing models needs a valid key but costs nothing
    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = join_url(&self.endpoint, "v1/models")?;
        let _: serde_json::Value = send_with_retry("anthropic", &RetryPolicy::none(), || {
            self.client
                .get(url.clone())
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
        })
        .await?;
        Ok(())
    }
}
