/*!
 * Error types for the subspell application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Recovery policy differs per kind:
 * - `ProviderError` and `ReassemblyError` are recovered per chunk (the chunk's
 *   cues keep their original text)
 * - `ChunkingError` is fatal and raised before any provider call
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The provider answered but the answer carried no text
    #[error("Provider returned an empty response")]
    EmptyResponse,

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The call did not finish within its time budget
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// No provider is registered under the requested name
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),
}

impl ProviderError {
    /// Whether the request may succeed if sent again
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::Timeout(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

/// Errors raised while mapping a corrected chunk back onto its cues
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReassemblyError {
    /// The provider returned a different number of segments than it was sent
    #[error("Segment count mismatch: expected {expected}, received {received}")]
    SegmentCountMismatch {
        /// Number of cues sent in the chunk
        expected: usize,
        /// Number of segments found in the response
        received: usize,
    },

    /// Protected formatting placeholders were lost or duplicated
    #[error("Formatting placeholders changed in cue {cue_index}: expected {expected}, received {received}")]
    TagMismatch {
        /// Index of the affected cue
        cue_index: usize,
        /// Placeholders sent
        expected: usize,
        /// Placeholders received
        received: usize,
    },
}

/// Invalid batching configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChunkingError {
    /// The token budget must be positive
    #[error("Invalid token budget: max_tokens must be greater than zero (got {0})")]
    InvalidTokenBudget(usize),

    /// The segment separator must not be empty
    #[error("Segment separator must not be empty")]
    EmptySeparator,
}

/// Errors that can occur during subtitle parsing and writing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubtitleError {
    /// Malformed content at a given line
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// File extension is not a known subtitle format
    #[error("Unsupported subtitle format: {0}")]
    UnsupportedFormat(String),

    /// ASS/SSA script without an [Events] section
    #[error("Invalid ASS format: couldn't find Events section")]
    MissingEventsSection,

    /// No cues could be read
    #[error("No subtitle entries found")]
    Empty,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from chunking configuration
    #[error("Chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
