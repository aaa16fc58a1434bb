mod common;

use std::time::{Duration, Instant};

use common::misinformation_report;
use infovar_core::{
    AnalysisRequest, EncodedMedia, ErrorKind, GatewayConfig, GatewayError, GeminiGateway,
    MisinformationLabel, ModelGateway, Orchestrator, RunOutcome, build_request,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";
const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

fn gateway_for(server: &MockServer) -> GeminiGateway {
    let config = GatewayConfig::default()
        .with_base_url(server.uri())
        .with_model(MODEL)
        .with_api_key("test-key");
    GeminiGateway::new(config).expect("client should build")
}

fn candidate(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn returns_candidate_text_and_sends_the_schema() {
    let server = MockServer::start().await;
    let report = misinformation_report().to_string();

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(&report)))
        .expect(1)
        .mount(&server)
        .await;

    let payload = build_request("Vaccines cause infertility", None);
    let text = gateway_for(&server).invoke(&payload).await.unwrap();
    assert_eq!(text, report);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body["generationConfig"]["responseSchema"]["required"]
            .as_array()
            .unwrap()
            .len(),
        7
    );
    assert_eq!(body["contents"][0]["parts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn inlines_video_parts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("{}")))
        .expect(1)
        .mount(&server)
        .await;

    let media = EncodedMedia {
        mime_type: "video/mp4".into(),
        payload: "aGVsbG8=".into(),
    };
    let payload = build_request("", Some(media));
    assert_eq!(gateway_for(&server).invoke(&payload).await.unwrap(), "{}");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body["contents"][0]["parts"][1],
        json!({ "inlineData": { "mimeType": "video/mp4", "data": "aGVsbG8=" } })
    );
}

#[tokio::test]
async fn unauthorized_maps_to_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": 401, "message": "Request had invalid authentication credentials.", "status": "UNAUTHENTICATED" }
        })))
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .invoke(&build_request("claim", None))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Auth { .. }), "{err:?}");
}

#[tokio::test]
async fn invalid_key_envelope_maps_to_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{ "reason": "API_KEY_INVALID" }]
            }
        })))
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .invoke(&build_request("claim", None))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Auth { .. }), "{err:?}");
}

#[tokio::test]
async fn server_failure_maps_to_model_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": { "code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .invoke(&build_request("claim", None))
        .await
        .unwrap_err();
    match err {
        GatewayError::Model { status, message } => {
            assert_eq!(status, Some(503));
            assert!(message.contains("overloaded"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn blocked_prompt_maps_to_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .invoke(&build_request("claim", None))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("SAFETY"), "{err}");
}

#[tokio::test]
async fn missing_key_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let config = GatewayConfig::default()
        .with_base_url(server.uri())
        .with_model(MODEL);
    let gateway = GeminiGateway::new(config).unwrap();

    let err = gateway
        .invoke(&build_request("claim", None))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Auth { .. }));
}

#[tokio::test]
async fn unreachable_endpoint_maps_to_network() {
    let config = GatewayConfig::default()
        .with_base_url("http://127.0.0.1:1")
        .with_model(MODEL)
        .with_api_key("test-key");
    let err = GeminiGateway::new(config)
        .unwrap()
        .invoke(&build_request("claim", None))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Network { .. }), "{err:?}");
}

#[tokio::test]
async fn slow_response_times_out_as_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate("{}"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = GatewayConfig::default()
        .with_base_url(server.uri())
        .with_model(MODEL)
        .with_api_key("test-key")
        .with_timeout(Duration::from_millis(200));
    let gateway = GeminiGateway::new(config).unwrap();
    assert_eq!(gateway.config().timeout, Duration::from_millis(200));

    let started = Instant::now();
    let err = gateway
        .invoke(&build_request("claim", None))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Network { .. }), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn orchestrated_run_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate(&misinformation_report().to_string())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(gateway_for(&server));
    let outcome = orchestrator
        .submit(AnalysisRequest::text("Vaccines cause infertility"))
        .await
        .unwrap();

    let result = outcome.result().expect("succeeded");
    assert_eq!(result.misinformation_label, MisinformationLabel::Misinformation);
    assert_eq!(result.harmfulness_score, 85.0);
}

#[tokio::test]
async fn orchestrated_run_reports_auth_kind() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(gateway_for(&server));
    let outcome = orchestrator
        .submit(AnalysisRequest::text("claim"))
        .await
        .unwrap();

    let RunOutcome::Failed(failure) = outcome else {
        panic!("expected failure");
    };
    assert_eq!(failure.kind, ErrorKind::Auth);
    assert!(!orchestrator.is_busy());
}
