//! Integration tests for the analysis client against a mock backend.

use std::time::Duration;

use chem_ai::{AnalysisBackend, AnalysisError, AnalyzerConfig, GeminiClient};
use chem_core::{AnalysisRequest, CurriculumLevel, ErrorCategory, Point, StillImage};
use chem_renderer::{StrokeCanvas, SurfaceConfig};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "test-model";
const KEY: &str = "test-key";
const ROUTE: &str = "/v1beta/models/test-model:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(AnalyzerConfig {
        api_key: Some(KEY.to_string()),
        model: MODEL.to_string(),
        endpoint: server.uri(),
        timeout: Duration::from_secs(5),
    })
    .expect("client")
}

fn benzene() -> Value {
    json!({
        "name": "Benzene",
        "iupacName": "Benzene",
        "molecularFormula": "C6H6",
        "summary": "An aromatic hydrocarbon with a planar ring.",
        "keyPoints": ["Planar hexagonal ring", "Delocalised pi electrons"],
        "reactions_or_uses": ["Electrophilic substitution", "Precursor to styrene"],
        "curriculumContext": "Hydrocarbons: aromatic compounds.",
        "analogy": "A ring of dancers sharing their hands equally.",
        "funFacts": ["Kekule reportedly dreamt of a snake biting its tail."]
    })
}

fn candidate_body(result: &Value) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": result.to_string()}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 10}
    })
}

fn error_body(code: u16, status: &str, message: &str) -> Value {
    json!({"error": {"code": code, "message": message, "status": status}})
}

async fn mount(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(ROUTE))
        .and(header("x-goog-api-key", KEY))
        .respond_with(template)
        .expect(1)
        .mount(server)
        .await;
}

async fn sent_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1, "exactly one request per analyze call");
    requests[0].body_json().expect("json body")
}

fn ring_still() -> StillImage {
    let mut canvas = StrokeCanvas::new(160, 160, SurfaceConfig::default()).expect("canvas");
    canvas.start_stroke(Point::new(120.0, 80.0));
    for i in 1..=24u8 {
        let angle = f32::from(i) * std::f32::consts::TAU / 24.0;
        canvas.extend_stroke(Point::new(80.0 + 40.0 * angle.cos(), 80.0 + 40.0 * angle.sin()));
    }
    canvas.end_stroke();
    canvas.export_still().expect("encode").expect("content")
}

// ==========================================================================
// Success
// ==========================================================================

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_success_passes_fields_through() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_json(candidate_body(&benzene()))).await;

    let result = client_for(&server)
        .analyze_input(None, Some("Benzene"), CurriculumLevel::Board)
        .await
        .expect("result");

    assert_eq!(serde_json::to_value(&result).expect("value"), benzene());
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_drawn_ring_at_board_level() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_json(candidate_body(&benzene()))).await;

    let still = ring_still();
    client_for(&server)
        .analyze_input(Some(still), None, CurriculumLevel::Board)
        .await
        .expect("result");

    let body = sent_body(&server).await;
    let parts = body["contents"][0]["parts"].as_array().expect("parts");
    assert_eq!(parts.len(), 2);

    let images: Vec<&Value> = parts.iter().filter(|p| p.get("inlineData").is_some()).collect();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0]["inlineData"]["mimeType"], "image/jpeg");
    assert!(!images[0]["inlineData"]["data"].as_str().expect("data").is_empty());

    let texts: Vec<&str> = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("senior secondary board syllabus"));

    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(body["generationConfig"]["responseSchema"]["required"].as_array().map(Vec::len), Some(8));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_typed_name_sends_no_image() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_json(candidate_body(&benzene()))).await;

    client_for(&server)
        .analyze_input(None, Some("Benzene"), CurriculumLevel::Foundation)
        .await
        .expect("result");

    let body = sent_body(&server).await;
    let parts = body["contents"][0]["parts"].as_array().expect("parts");
    assert_eq!(parts.len(), 1);
    assert!(parts[0].get("inlineData").is_none());
    assert!(parts[0]["text"].as_str().expect("text").contains("Benzene"));
}

// ==========================================================================
// Validation
// ==========================================================================

#[tokio::test]
async fn test_no_input_fails_validation_for_every_level() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    for level in CurriculumLevel::ALL {
        let err = client
            .analyze_input(None, None, level)
            .await
            .expect_err("validation");
        assert!(matches!(err, AnalysisError::Validation(_)), "{level}");

        let err = client
            .analyze_input(Some(StillImage::from_bytes(Vec::new())), Some("   "), level)
            .await
            .expect_err("validation");
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty());
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_unsupported_image_rejected_without_request() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let stills = [
        b"GIF89a\x01\x00\x01\x00\x00\x00".to_vec(),
        b"RIFF\x24\x00\x00\x00WEBPVP8 ".to_vec(),
    ];
    for bytes in stills {
        let still = StillImage::from_bytes(bytes);
        let err = client
            .analyze_input(Some(still), Some("Water"), CurriculumLevel::Board)
            .await
            .expect_err("unsupported");
        assert!(matches!(err, AnalysisError::Unknown(_)), "{err:?}");
        assert!(err.user_message().contains("PNG and JPEG"));
    }

    assert!(server.received_requests().await.expect("recording").is_empty());
}

#[tokio::test]
async fn test_missing_key_fails_auth_without_request() {
    let server = MockServer::start().await;
    let client = GeminiClient::new(AnalyzerConfig {
        api_key: None,
        endpoint: server.uri(),
        ..AnalyzerConfig::default()
    })
    .expect("client");

    let request =
        AnalysisRequest::new(None, Some("Water"), CurriculumLevel::Board).expect("request");
    let err = client.analyze(&request).await.expect_err("auth");
    assert_eq!(err.category(), ErrorCategory::Auth);
    assert!(server.received_requests().await.expect("recording").is_empty());
}

// ==========================================================================
// Failure classification
// ==========================================================================

async fn analyze_against(template: ResponseTemplate) -> AnalysisError {
    let server = MockServer::start().await;
    mount(&server, template).await;
    client_for(&server)
        .analyze_input(None, Some("Benzene"), CurriculumLevel::Competitive)
        .await
        .expect_err("failure")
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_non_json_body_is_malformed_regardless_of_status() {
    for status in [200, 500] {
        let err = analyze_against(
            ResponseTemplate::new(status).set_body_string("<html>Bad Gateway</html>"),
        )
        .await;
        assert_eq!(err.category(), ErrorCategory::MalformedResponse, "status {status}");
    }
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_missing_required_field_is_malformed() {
    let mut partial = benzene();
    partial.as_object_mut().expect("object").remove("molecularFormula");
    let err =
        analyze_against(ResponseTemplate::new(200).set_body_json(candidate_body(&partial))).await;
    assert!(matches!(err, AnalysisError::MalformedResponse(_)));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_rate_limited() {
    let err = analyze_against(ResponseTemplate::new(429).set_body_json(error_body(
        429,
        "RESOURCE_EXHAUSTED",
        "Resource has been exhausted (e.g. check quota).",
    )))
    .await;
    assert_eq!(err.category(), ErrorCategory::RateLimited);
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_overloaded_is_rate_limited() {
    let err = analyze_against(ResponseTemplate::new(503).set_body_json(error_body(
        503,
        "UNAVAILABLE",
        "The model is overloaded. Please try again later.",
    )))
    .await;
    assert_eq!(err.category(), ErrorCategory::RateLimited);
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_access_denied() {
    let err = analyze_against(ResponseTemplate::new(403).set_body_json(error_body(
        403,
        "PERMISSION_DENIED",
        "User location is not supported for the API use.",
    )))
    .await;
    assert_eq!(err.category(), ErrorCategory::AccessDenied);
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_invalid_key() {
    let err = analyze_against(ResponseTemplate::new(400).set_body_json(error_body(
        400,
        "INVALID_ARGUMENT",
        "API key not valid. Please pass a valid API key.",
    )))
    .await;
    assert_eq!(err.category(), ErrorCategory::Auth);
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_unknown_error_passes_message_through() {
    let err = analyze_against(ResponseTemplate::new(500).set_body_json(error_body(
        500,
        "INTERNAL",
        "An internal error has occurred.",
    )))
    .await;
    let message = err.user_message();
    assert!(message.contains("An internal error has occurred."), "{message}");
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_safety_block_is_content_policy() {
    let err = analyze_against(
        ResponseTemplate::new(200).set_body_json(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
    )
    .await;
    assert_eq!(err.category(), ErrorCategory::ContentPolicy);

    let err = analyze_against(ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{"finishReason": "SAFETY"}]
    })))
    .await;
    assert_eq!(err.category(), ErrorCategory::ContentPolicy);
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_unreachable_backend_is_network() {
    let server = MockServer::start().await;
    let endpoint = server.uri();
    drop(server);

    let client = GeminiClient::new(AnalyzerConfig {
        api_key: Some(KEY.to_string()),
        model: MODEL.to_string(),
        endpoint,
        timeout: Duration::from_secs(2),
    })
    .expect("client");

    let err = client
        .analyze_input(None, Some("Benzene"), CurriculumLevel::Board)
        .await
        .expect_err("network");
    assert_eq!(err.category(), ErrorCategory::Network);
}
