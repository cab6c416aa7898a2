use subspell::app_config::{Config, ProviderKind};
use subspell::errors::ProviderError;
use subspell::providers::{create_provider, ProviderSettings, RetryPolicy};

#[test]
fn test_create_provider_withConfigSettings_shouldPickConfiguredVendor() {
    let mut config = Config::default();
    config.correction.provider = ProviderKind::Anthropic;
    config.correction.active_provider_config_mut().api_key = "test-key".to_string();
    config.correction.common.retry_count = 1;

    let settings = config.correction.provider_settings();
    assert_eq!(settings.retry.max_retries, 1);
    assert_eq!(settings.endpoint, "https://api.anthropic.com");

    let provider = create_provider(&settings).unwrap();
    assert_eq!(provider.name(), "anthropic");
}

#[test]
fn test_create_provider_withBlankKey_shouldFailWithAuthenticationError() {
    let settings = ProviderSettings {
        kind: ProviderKind::OpenAI,
        api_key: "   ".to_string(),
        endpoint: String::new(),
        retry: RetryPolicy::none(),
    };
    assert!(matches!(create_provider(&settings), Err(ProviderError::AuthenticationError(_))));
}

#[test]
fn test_create_provider_withOllama_shouldNotNeedKey() {
    let settings = ProviderSettings {
        kind: ProviderKind::Ollama,
        api_key: String::new(),
        endpoint: "localhost:11434".to_string(),
        retry: RetryPolicy::default(),
    };
    assert_eq!(create_provider(&settings).unwrap().name(), "ollama");
}
