use subspell::errors::ProviderError;
use subspell::providers::openai::{OpenAI, OpenAIRequest, OpenAIResponse};
use subspell::providers::SamplingConfig;

#[test]
fn test_openai_request_builder_withAllOptions_shouldSerialize() {
    let request = OpenAIRequest::new("gpt-4o-mini")
        .add_message("system", "Поправи")
        .add_message("user", "текст")
        .temperature(0.5)
        .top_p(0.9)
        .max_tokens(256);

    let json = serde_json::to_string(&request).expect("Failed to serialize request");
    assert!(json.contains(r#""model":"gpt-4o-mini""#));
    assert!(json.contains(r#""max_tokens":256"#));
    assert!(json.contains(r#""temperature":0.5"#));
    assert!(json.contains(r#""role":"system""#));
}

#[test]
fn test_openai_build_request_withSampling_shouldOmitTopK() {
    let sampling = SamplingConfig {
        model: "gpt-4o-mini".to_string(),
        ..SamplingConfig::default()
    };
    let json = serde_json::to_value(OpenAI::build_request("текст", "инструкция", &sampling)).unwrap();

    assert!(json.get("top_k").is_none());
    assert_eq!(json["messages"].as_array().unwrap().len(), 4);
    assert_eq!(json["messages"][3]["content"], "текст");
}

#[test]
fn test_openai_extract_text_withNullContent_shouldReportEmptyResponse() {
    let response: OpenAIResponse =
        serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#).unwrap();
    assert_eq!(OpenAI::extract_text_from_response(&response), Err(ProviderError::EmptyResponse));

    let response: OpenAIResponse =
        serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"Готово."}}]}"#).unwrap();
    assert_eq!(OpenAI::extract_text_from_response(&response).unwrap(), "Готово.");
}
