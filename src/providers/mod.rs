/*!
 * Provider implementations for different correction services.
 *
 * This module contains client implementations for various LLM providers:
 * - Gemini: Google Generative Language API (default)
 * - OpenAI: OpenAI chat completions, or any compatible server
 * - Anthropic: Anthropic messages API
 * - Ollama: Local LLM server
 * - Mock: scriptable provider for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::ProviderKind;
use crate::errors::ProviderError;

pub mod anthropic;
pub mod gemini;
pub mod http;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use self::http::RetryPolicy;

/// Sampling parameters forwarded to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Model identifier
    pub model: String,
    /// Temperature (0.0 to 1.0)
    pub temperature: f32,
    /// Top-k sampling
    pub top_k: u32,
    /// Nucleus sampling
    pub top_p: f32,
    /// Upper bound on generated tokens
    pub max_output_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.2,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 8192,
        }
    }
}

/// Common trait for all correction providers
///
/// Implementations send `instructions` as the system prompt, followed by the
/// built-in few-shot exchange and the text to correct, and return the
/// model's text answer.
#[async_trait]
pub trait CorrectionProvider: Send + Sync + Debug {
    /// Short provider identifier used in logs
    fn name(&self) -> &str;

    /// Correct a piece of text
    ///
    /// # Arguments
    /// * `text` - Text to correct, possibly several segments joined by a separator
    /// * `instructions` - System instructions
    /// * `sampling` - Model and sampling parameters
    async fn correct(
        &self,
        text: &str,
        instructions: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// Connection settings for building a provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// Which vendor to talk to
    pub kind: ProviderKind,
    /// API key, empty for Ollama
    pub api_key: String,
    /// Base URL of the service
    pub endpoint: String,
    /// Retry behaviour for transient failures
    pub retry: RetryPolicy,
}

/// Build the provider selected by `settings`
pub fn create_provider(settings: &ProviderSettings) -> Result<Arc<dyn CorrectionProvider>, ProviderError> {
    if settings.kind.requires_api_key() && settings.api_key.trim().is_empty() {
        return Err(ProviderError::AuthenticationError(format!(
            "{} requires an API key",
            settings.kind.display_name()
        )));
    }

    let provider: Arc<dyn CorrectionProvider> = match settings.kind {
        ProviderKind::Gemini => Arc::new(gemini::Gemini::new(
            &settings.api_key,
            &settings.endpoint,
            settings.retry.clone(),
        )?),
        ProviderKind::OpenAI => Arc::new(openai::OpenAI::new(
            &settings.api_key,
            &settings.endpoint,
            settings.retry.clone(),
        )?),
        ProviderKind::Anthropic => Arc::new(anthropic::Anthropic::new(
            &settings.api_key,
            &settings.endpoint,
            settings.retry.clone(),
        )?),
        ProviderKind::Ollama => Arc::new(ollama::Ollama::new(&settings.endpoint, settings.retry.clone())?),
    };

    Ok(provider)
}

/// Build a provider from its configuration name
pub fn create_provider_by_name(
    name: &str,
    api_key: &str,
    endpoint: &str,
) -> Result<Arc<dyn CorrectionProvider>, ProviderError> {
    let kind: ProviderKind = name
        .parse()
        .map_err(|_| ProviderError::UnsupportedProvider(name.to_string()))?;

    create_provider(&ProviderSettings {
        kind,
        api_key: api_key.to_string(),
        endpoint: endpoint.to_string(),
        retry: RetryPolicy::default(),
    })
}
