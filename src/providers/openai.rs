/*!
 * OpenAI chat completions client. Works with any server exposing the same
 * `/chat/completions` route.
 */

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::language_rules::few_shot_examples;

use super::http::{build_client, join_url, send_with_retry, RetryPolicy};
use super::{CorrectionProvider, SamplingConfig};

/// OpenAI client
#[derive(Debug)]
pub struct OpenAI {
    client: Client,
    api_key: String,
    endpoint: String,
    retry: RetryPolicy,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl OpenAIRequest {
    /// Create a new request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            top_p: None,
            max_tokens: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: Some(content.into()),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the top_p (nucleus sampling)
    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set the generation limit
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(api_key: &str, endpoint: &str, retry: RetryPolicy) -> Result<Self, ProviderError> {
        let endpoint = if endpoint.is_empty() {
            "https://api.openai.com/v1".to_string()
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

    /// Build the full request for a correction; top_k has no equivalent here
    pub fn build_request(text: &str, instructions: &str, sampling: &SamplingConfig) -> OpenAIRequest {
        let mut request = OpenAIRequest::new(&sampling.model).add_message("system", instructions);
        for example in few_shot_examples() {
            request = request
                .add_message("user", example.input)
                .add_message("assistant", example.output);
        }
        request
            .add_message("user", text)
            .temperature(sampling.temperature)
            .top_p(sampling.top_p)
            .max_tokens(sampling.max_output_tokens)
    }

    /// Send a chat completion request
    pub async fn complete(&self, request: &OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let url = join_url(&self.endpoint, "chat/completions")?;

        send_with_retry("openai", &self.retry, || {
            self.client
                .post(url.clone())
                .bearer_auth(&self.api_key)
                .json(request)
        })
        .await
    }

    /// Extract text from the first choice
    pub fn extract_text_from_response(response: &OpenAIResponse) -> Result<String, ProviderError> {
        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|text| !text.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }
}

#[async_trait]
impl CorrectionProvider for OpenAI {
    fn name(&self) -> &str {
        "openai"
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

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = join_url(&self.endpoint, "models")?;
        let _: serde_json::Value = send_with_retry("openai", &RetryPolicy::none(), || {
            self.client.get(url.clone()).bearer_auth(&self.api_key)
        })
        .await?;
        Ok(())
    }
}
