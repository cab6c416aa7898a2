use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::language_rules::few_shot_examples;

use super::http::{build_client, join_url, send_with_retry, RetryPolicy};
use super::{CorrectionProvider, SamplingConfig};

/// Client for a local Ollama server
#[derive(Debug)]
pub struct Ollama {
    /// Server root, e.g. http://localhost:11434
    base_url: String,
    /// Shared HTTP client
    client: Client,
    /// Retry behaviour, local servers mostly fail while loading a model
    retry: RetryPolicy,
}

/// Sampling options understood by Ollama
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct GenerationOptions {
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Nucleus sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    /// Top-k cutoff
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    /// Output token cap (`num_predict`)
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Message text
    #[serde(default)]
    pub content: String,
}

/// Body of an `api/chat` call
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model tag
    model: String,
    /// System prompt, few-shot turns, then the text
    messages: Vec<ChatMessage>,
    /// Sampling options
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Always false, answers are read whole
    stream: bool,
}

/// Non-streaming `api/chat` answer
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Response message
    pub message: ChatMessage,
    /// Set once generation finished
    #[serde(default)]
    pub done: bool,
    /// Generated token count
    #[serde(default)]
    pub eval_count: Option<u64>,
}

impl ChatRequest {
    /// Create a new non-streaming chat request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            options: None,
            stream: false,
        }
    }

    /// Add a message to the conversation
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the sampling options
    pub fn sampling(mut self, sampling: &SamplingConfig) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(sampling.temperature),
            top_p: Some(sampling.top_p),
            top_k: Some(sampling.top_k),
            num_predict: Some(sampling.max_output_tokens),
        });
        self
    }
}

impl Ollama {
    /// Create a new Ollama client for a base URL such as `http://localhost:11434`
    pub fn new(base_url: &str, retry: RetryPolicy) -> Result<Self, ProviderError> {
        let base_url = if base_url.is_empty() {
            "http://localhost:11434".to_string()
        } else if base_url.starts_with("http://") || base_url.starts_with("https://") {
            base_url.to_string()
        } else {
            // No scheme, assume plain http
            format!("http://{}", base_url)
        };

        Ok(Self {
            base_url,
            client: build_client()?,
            retry,
        })
    }

    /// Build the full request for a correction
    pub fn build_request(text: &str, instructions: &str, sampling: &SamplingConfig) -> ChatRequest {
        let mut request = ChatRequest::new(&sampling.model).add_message("system", instructions);
        for example in few_shot_examples() {
            request = request
                .add_message("user", example.input)
                .add_message("assistant", example.output);
        }
        request.add_message("user", text).sampling(sampling)
    }

    /// Post a chat request
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = join_url(&self.base_url, "api/chat")?;

        send_with_retry("ollama", &self.retry, || self.client.post(url.clone()).json(request)).await
    }

    /// Server version, used as a health check
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = join_url(&self.base_url, "api/version")?;
        let response: serde_json::Value =
            send_with_retry("ollama", &RetryPolicy::none(), || self.client.get(url.clone())).await?;

        response["version"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }
}

#[async_trait]
impl CorrectionProvider for Ollama {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn correct(
        &self,
        text: &str,
        instructions: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, ProviderError> {
        let request = Self::build_request(text, instructions, sampling);
        let response = self.chat(&request).await?;

        if response.message.content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(response.message.content)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.version().await.map(|_| ())
    }
}
