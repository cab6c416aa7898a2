use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::correction::chunker::ChunkingConfig;
use crate::correction::concurrency::ProviderProfile;
use crate::correction::markers::DEFAULT_SEPARATOR;
use crate::language_rules::BG_SYSTEM_INSTRUCTION;
use crate::providers::{ProviderSettings, RetryPolicy, SamplingConfig};

/// Everything read from `config.json`; missing sections fall back to defaults
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Correction provider and request settings
    #[serde(default)]
    pub correction: CorrectionConfig,

    /// How cues are grouped into requests
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Correction provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: OpenAI or any compatible endpoint
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: Ollama
    Ollama,
}

impl ProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }

    // @returns: Environment variable holding the API key
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama => None,
        }
    }

    /// Whether requests need an API key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max concurrent requests, 0 uses the provider profile
    #[serde(default)]
    pub concurrent_requests: usize,
}

impl ProviderConfig {
    // @param kind: Provider enum
    // @returns: Provider config with defaults
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            provider_type: kind.to_lowercase_string(),
            model: default_model(kind),
            api_key: String::new(),
            endpoint: default_endpoint(kind),
            concurrent_requests: 0,
        }
    }
}

/// Correction service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CorrectionConfig {
    /// Correction provider to use
    #[serde(default)]
    pub provider: ProviderKind,

    /// Available correction providers
    #[serde(default = "default_available_providers")]
    pub available_providers: Vec<ProviderConfig>,

    /// Settings shared by all providers
    #[serde(default)]
    pub common: CorrectionCommonConfig,
}

/// Common correction settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CorrectionCommonConfig {
    /// System instructions sent with every chunk
    #[serde(default = "default_instructions")]
    pub instructions: String,

    /// Separator placed between cue texts in a request
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Top-k sampling (1 to 100)
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Nucleus sampling (0.0 to 1.0)
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Maximum tokens the model may generate per request
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl CorrectionCommonConfig {
    /// Instructions as sent to the model: the built-in `§SEP§` marker is
    /// replaced by the configured separator
    pub fn resolved_instructions(&self) -> String {
        if self.separator == DEFAULT_SEPARATOR {
            self.instructions.clone()
        } else {
            self.instructions.replace(DEFAULT_SEPARATOR, &self.separator)
        }
    }
}

impl Default for CorrectionCommonConfig {
    fn default() -> Self {
        Self {
            instructions: default_instructions(),
            separator: default_separator(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_instructions() -> String {
    BG_SYSTEM_INSTRUCTION.to_string()
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_top_k() -> u32 {
    40
}

fn default_top_p() -> f32 {
    0.95
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_model(kind: ProviderKind) -> String {
    match kind {
        ProviderKind::Gemini => "gemini-2.0-flash",
        ProviderKind::OpenAI => "gpt-4o-mini",
        ProviderKind::Anthropic => "claude-3-5-haiku-latest",
        ProviderKind::Ollama => "llama3.2:3b",
    }
    .to_string()
}

fn default_endpoint(kind: ProviderKind) -> String {
    match kind {
        ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
        ProviderKind::OpenAI => "https://api.openai.com/v1",
        ProviderKind::Anthropic => "https://api.anthropic.com",
        ProviderKind::Ollama => "http://localhost:11434",
    }
    .to_string()
}

fn default_available_providers() -> Vec<ProviderConfig> {
    [
        ProviderKind::Gemini,
        ProviderKind::OpenAI,
        ProviderKind::Anthropic,
        ProviderKind::Ollama,
    ]
    .into_iter()
    .map(ProviderConfig::new)
    .collect()
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            available_providers: default_available_providers(),
            common: CorrectionCommonConfig::default(),
        }
    }
}

impl CorrectionConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, kind: &ProviderKind) -> Option<&ProviderConfig> {
        let provider_str = kind.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider entry, created when missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let position = match self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str)
        {
            Some(position) => position,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[position]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        default_model(self.provider)
    }

    /// Get the API key for the active provider, falling back to its environment variable
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        self.provider
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        default_endpoint(self.provider)
    }

    /// Concurrent requests for the active provider
    pub fn concurrent_requests(&self) -> usize {
        let configured = self
            .get_active_provider_config()
            .map(|provider_config| provider_config.concurrent_requests);
        ProviderProfile::for_provider(self.provider).effective_concurrent_requests(configured)
    }

    /// Sampling parameters for the active provider
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig {
            model: self.get_model(),
            temperature: self.common.temperature,
            top_k: self.common.top_k,
            top_p: self.common.top_p,
            max_output_tokens: self.common.max_output_tokens,
        }
    }

    /// Everything the provider factory needs
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            kind: self.provider,
            api_key: self.get_api_key(),
            endpoint: self.get_endpoint(),
            retry: RetryPolicy {
                max_retries: self.common.retry_count,
                backoff_base_ms: self.common.retry_backoff_ms,
            },
        }
    }
}

impl Config {
    /// Default location: `~/.subspell/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".subspell").join("config.json"))
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Write the configuration as pretty JSON, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
            }
        }

        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Load the configuration, writing the defaults first when the file is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let common = &self.correction.common;

        if !(0.0..=1.0).contains(&common.temperature) {
            return Err(anyhow!("Temperature must be between 0 and 1 (got {})", common.temperature));
        }
        if !(1..=100).contains(&common.top_k) {
            return Err(anyhow!("top_k must be between 1 and 100 (got {})", common.top_k));
        }
        if !(0.0..=1.0).contains(&common.top_p) {
            return Err(anyhow!("top_p must be between 0 and 1 (got {})", common.top_p));
        }
        if common.separator.trim().is_empty() {
            return Err(anyhow!("Segment separator must not be empty"));
        }
        if !common.resolved_instructions().contains(common.separator.as_str()) {
            return Err(anyhow!(
                "Instructions never mention the segment separator {:?}; the model would not keep it",
                common.separator
            ));
        }
        if common.request_timeout_secs == 0 {
            return Err(anyhow!("Request timeout must be greater than zero"));
        }
        self.chunking.validate()?;

        // Validate API key for all providers except Ollama
        if self.correction.provider.requires_api_key() && self.correction.get_api_key().is_empty() {
            return Err(anyhow!(
                "API key is required for {} provider (set it in the config, pass --api-key or export {})",
                self.correction.provider.display_name(),
                self.correction.provider.api_key_env_var().unwrap_or("the API key variable")
            ));
        }

        Ok(())
    }
}
