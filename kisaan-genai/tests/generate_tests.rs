//! Wire-level tests for the Gemini client against a local stub server.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::{json, Value};

use kisaan_genai::{GenAiClient, GenAiError};

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
}

/// Records the request path and API key header the client sent.
#[derive(Clone, Default)]
struct Seen {
    path: Arc<Mutex<Option<String>>>,
    api_key: Arc<Mutex<Option<String>>>,
}

async fn recording_handler(
    State(seen): State<Seen>,
    uri: Uri,
    headers: HeaderMap,
    Json(_body): Json<Value>,
) -> Json<Value> {
    *seen.path.lock().unwrap() = Some(uri.path().to_string());
    *seen.api_key.lock().unwrap() =
        headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()).map(str::to_string);

    Json(json!({
        "candidates": [{
            "content": {
                "parts": [{"text": "Sow wheat in November."}],
                "role": "model"
            }
        }]
    }))
}

#[tokio::test]
async fn generate_targets_the_configured_model_and_returns_candidate_text() {
    let seen = Seen::default();
    let base =
        spawn_stub(Router::new().fallback(recording_handler).with_state(seen.clone())).await;

    let client = GenAiClient::new("test-key")
        .unwrap()
        .with_model("gemini-2.5-flash")
        .with_base_url(base);
    let reply = client
        .generate("You are a farming assistant.", "When do I sow wheat?")
        .await
        .unwrap();

    assert_eq!(reply, "Sow wheat in November.");
    assert_eq!(
        seen.path.lock().unwrap().as_deref(),
        Some("/models/gemini-2.5-flash:generateContent")
    );
    assert_eq!(seen.api_key.lock().unwrap().as_deref(), Some("test-key"));
}

async fn quota_handler() -> impl IntoResponse {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({"error": {"message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}})),
    )
}

#[tokio::test]
async fn non_success_status_becomes_a_typed_api_error() {
    let base = spawn_stub(Router::new().fallback(quota_handler)).await;

    let client = GenAiClient::new("test-key").unwrap().with_base_url(base);
    let err = client.generate("system", "question").await.unwrap_err();

    match err {
        GenAiError::ApiError { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "Quota exceeded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn response_without_candidates_is_an_empty_response_error() {
    let base = spawn_stub(Router::new().fallback(|| async {
        // A safety-blocked prompt returns no candidates.
        Json(json!({"promptFeedback": {"blockReason": "SAFETY"}}))
    }))
    .await;

    let client = GenAiClient::new("test-key").unwrap().with_base_url(base);
    let err = client.generate("system", "question").await.unwrap_err();
    assert!(matches!(err, GenAiError::EmptyResponse));
}
