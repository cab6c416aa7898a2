use subspell::errors::ProviderError;
use subspell::providers::mock::MockProvider;
use subspell::providers::{CorrectionProvider, SamplingConfig};

#[tokio::test]
async fn test_mock_provider_withCustomGenerator_shouldRecordModelAndInstructions() {
    let provider = MockProvider::custom(|text| Ok(text.to_uppercase()));
    let sampling = SamplingConfig {
        model: "test-model".to_string(),
        ..SamplingConfig::default()
    };

    let answer = provider.correct("абв", "правила", &sampling).await.unwrap();
    assert_eq!(answer, "АБВ");

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "test-model");
    assert_eq!(requests[0].instructions, "правила");
}

#[tokio::test]
async fn test_mock_provider_withFixedAnswer_shouldIgnoreInput() {
    let provider = MockProvider::fixed("Готово.");
    let answer = provider.correct("каквото и да е", "", &SamplingConfig::default()).await;
    assert_eq!(answer, Ok("Готово.".to_string()));
    assert!(provider.test_connection().await.is_ok());
}

#[tokio::test]
async fn test_mock_provider_withFailingBehavior_shouldReturnServerError() {
    let provider = MockProvider::failing();
    let result = provider.correct("x", "", &SamplingConfig::default()).await;
    assert!(matches!(result, Err(ProviderError::ApiError { status_code: 500, .. })));
}
