/*!
 * HTTP plumbing shared by the remote providers: client construction, URL
 * joining, status classification and the retry loop.
 */

use log::{debug, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;

/// Socket-level timeout; the pipeline applies its own per-call budget on top
const CLIENT_TIMEOUT_SECS: u64 = 300;

/// Exponential backoff settings for transient failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each further retry
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// No retries at all
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    /// Delay before retry number `retry` (0-based)
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }
}

/// HTTP client with connection pooling for concurrent chunk requests
pub fn build_client() -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(CLIENT_TIMEOUT_SECS))
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))
}

/// Join `path` onto `base`, keeping any path prefix in `base` (e.g. `/v1`)
pub fn join_url(base: &str, path: &str) -> Result<Url, ProviderError> {
    let base = Url::parse(&format!("{}/", base.trim_end_matches('/')))
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint '{}': {}", base, e)))?;
    base.join(path.trim_start_matches('/'))
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid request path '{}': {}", path, e)))
}

/// Map a non-success HTTP status to a provider error
pub fn classify_status(status: StatusCode, body: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(body),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(body),
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message: body,
        },
    }
}

/// Map a transport failure to a provider error
pub fn classify_transport(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(CLIENT_TIMEOUT_SECS * 1_000)
    } else if error.is_decode() {
        ProviderError::ParseError(error.to_string())
    } else if error.is_connect() || error.is_request() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

async fn send_once<R: DeserializeOwned>(request: RequestBuilder) -> Result<R, ProviderError> {
    let response = request.send().await.map_err(classify_transport)?;
    let status = response.status();

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());
        return Err(classify_status(status, body));
    }

    let body = response.text().await.map_err(classify_transport)?;
    serde_json::from_str::<R>(&body).map_err(|e| {
        let preview: String = body.chars().take(500).collect();
        ProviderError::ParseError(format!("{} (response starts with: {})", e, preview))
    })
}

/// Send a JSON request, retrying transient failures with exponential backoff.
///
/// `build` is called once per attempt since a sent request cannot be reused.
pub async fn send_with_retry<R, F>(provider: &str, policy: &RetryPolicy, build: F) -> Result<R, ProviderError>
where
    R: DeserializeOwned,
    F: Fn() -> RequestBuilder,
{
    let mut retry = 0;

    loop {
        match send_once::<R>(build()).await {
            Ok(response) => {
                if retry > 0 {
                    debug!("{} request succeeded after {} retries", provider, retry);
                }
                return Ok(response);
            }
            Err(e) if e.is_retryable() && retry < policy.max_retries => {
                let delay = policy.backoff_for(retry);
                retry += 1;
                warn!(
                    "{} request failed: {} - retry {}/{} in {:?}",
                    provider, e, retry, policy.max_retries, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
