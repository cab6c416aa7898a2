/*!
 * Google Gemini client (Generative Language API, `generateContent`).
 */

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::language_rules::few_shot_examples;

use super::http::{build_client, join_url, send_with_retry, RetryPolicy};
use super::{CorrectionProvider, SamplingConfig};

/// Gemini client for interacting with the Generative Language API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL
    endpoint: String,
    /// Retry behaviour
    retry: RetryPolicy,
}

/// Text part of a content block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

/// One conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    /// "user" or "model"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart { text: text.into() }],
        }
    }
}

/// Sampling settings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
    response_mime_type: String,
}

impl From<&SamplingConfig> for GenerationConfig {
    fn from(sampling: &SamplingConfig) -> Self {
        Self {
            temperature: sampling.temperature,
            top_k: sampling.top_k,
            top_p: sampling.top_p,
            max_output_tokens: sampling.max_output_tokens,
            response_mime_type: "text/plain".to_string(),
        }
    }
}

/// `generateContent` request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GeminiRequest {
    /// Create an empty request
    pub fn new() -> Self {
        Self {
            system_instruction: None,
            contents: Vec::new(),
            generation_config: None,
        }
    }

    /// Set the system instruction
    pub fn system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(GeminiContent::text(None, instruction));
        self
    }

    /// Add a conversation turn
    pub fn add_turn(mut self, role: &str, text: impl Into<String>) -> Self {
        self.contents.push(GeminiContent::text(Some(role), text));
        self
    }

    /// Set the sampling configuration
    pub fn generation_config(mut self, sampling: &SamplingConfig) -> Self {
        self.generation_config = Some(GenerationConfig::from(sampling));
        self
    }
}

impl Default for GeminiRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Candidate answer
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// `generateContent` response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(api_key: &str, endpoint: &str, retry: RetryPolicy) -> Result<Self, ProviderError> {
        let endpoint = if endpoint.is_empty() {
            "https://generativelanguage.googleapis.com".to_string()
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
    pub fn build_request(text: &str, instructions: &str, sampling: &SamplingConfig) -> GeminiRequest {
        let mut request = GeminiRequest::new().system(instructions);
        for example in few_shot_examples() {
            request = request.add_turn("user", example.input).add_turn("model", example.output);
        }
        request.add_turn("user", text).generation_config(sampling)
    }

    /// Send a generateContent request
    pub async fn complete(&self, model: &str, request: &GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        let url = join_url(&self.endpoint, &format!("v1beta/models/{}:generateContent", model))?;

        send_with_retry("gemini", &self.retry, || {
            self.client
                .post(url.clone())
                .header("x-goog-api-key", &self.api_key)
                .json(request)
        })
        .await
    }

    /// Extract text from the first candidate
    pub fn extract_text_from_response(response: &GeminiResponse) -> Result<String, ProviderError> {
        let text: String = response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.iter().map(|part| part.text.as_str()).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl CorrectionProvider for Gemini {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn correct(
        &self,
        text: &str,
        instructions: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, ProviderError> {
        let request = Self::build_request(text, instructions, sampling);
        let response = self.complete(&sampling.model, &request).await?;
        Self::extract_text_from_response(&response)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = join_url(&self.endpoint, "v1beta/models")?;
        let _: serde_json::Value = send_with_retry("gemini", &RetryPolicy::none(), || {
            self.client.get(url.clone()).header("x-goog-api-key", &self.api_key)
        })
        .await?;
        Ok(())
    }
}
