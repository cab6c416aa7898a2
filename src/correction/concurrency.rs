/*!
 * Provider-specific concurrency defaults.
 *
 * Remote APIs are rate limited per key, so the pool size used when the
 * configuration does not set one depends on the provider.
 */

use crate::app_config::ProviderKind;

/// Provider-specific concurrency profile with tuned defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Maximum concurrent requests
    pub max_concurrent_requests: usize,
}

impl ProviderProfile {
    /// Get the profile for a given provider
    pub fn for_provider(provider: ProviderKind) -> Self {
        match provider {
            // Free tier allows 15 requests per minute
            ProviderKind::Gemini => Self {
                max_concurrent_requests: 4,
            },
            ProviderKind::OpenAI => Self {
                max_concurrent_requests: 8,
            },
            ProviderKind::Anthropic => Self {
                max_concurrent_requests: 4,
            },
            // Local model, the GPU is the bottleneck
            ProviderKind::Ollama => Self {
                max_concurrent_requests: 2,
            },
        }
    }

    /// Get effective concurrent requests, respecting any user override
    pub fn effective_concurrent_requests(&self, user_override: Option<usize>) -> usize {
        user_override
            .filter(|n| *n > 0)
            .unwrap_or(self.max_concurrent_requests)
    }
}
