use subspell::errors::ProviderError;
use subspell::language_rules::FEW_SHOT_OUTPUT;
use subspell::providers::gemini::{Gemini, GeminiResponse};
use subspell::providers::SamplingConfig;

#[test]
fn test_gemini_request_withDefaults_shouldUseCamelCaseFields() {
    let request = Gemini::build_request("Аз немога", "Поправи текста", &SamplingConfig::default());
    let json = serde_json::to_value(&request).expect("Failed to serialize request");

    assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Поправи текста");
    assert_eq!(json["generationConfig"]["topK"], 40);
    assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
    assert_eq!(json["generationConfig"]["responseMimeType"], "text/plain");

    // Few-shot pair first, then the text to correct
    let contents = json["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[1]["role"], "model");
    assert_eq!(contents[1]["parts"][0]["text"], FEW_SHOT_OUTPUT);
    assert_eq!(contents[2]["role"], "user");
    assert_eq!(contents[2]["parts"][0]["text"], "Аз немога");
}

#[test]
fn test_gemini_extract_text_withMultipleParts_shouldConcatenate() {
    let response: GeminiResponse = serde_json::from_str(
        r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Аз не мога "},{"text":"да дойда."}]},"finishReason":"STOP"}]}"#,
    )
    .unwrap();

    assert_eq!(Gemini::extract_text_from_response(&response).unwrap(), "Аз не мога да дойда.");
}

#[test]
fn test_gemini_extract_text_withoutCandidates_shouldReportEmptyResponse() {
    let response: GeminiResponse = serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
    assert_eq!(Gemini::extract_text_from_response(&response), Err(ProviderError::EmptyResponse));
}
