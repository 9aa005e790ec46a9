mod common;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use common::{TempStore, app, pune_request, sample_payload, send};
use farm_advisor::service::advisor::{FALLBACK_RECOMMENDATIONS, GeminiAdvisor};
use farm_advisor::service::weather::StaticWeather;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

#[derive(Clone)]
struct FakeGemini {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn generate_content(
    State(fake): State<FakeGemini>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    fake.seen.lock().unwrap().push((key, body));
    (fake.status, Json(fake.reply.clone())).into_response()
}

/// Serve a canned Gemini reply on an ephemeral port; returns its base url.
async fn spawn_fake_gemini(status: StatusCode, reply: Value) -> (Url, FakeGemini) {
    let fake = FakeGemini {
        status,
        reply,
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let router = Router::new()
        .route("/v1beta/models/{*rest}", post(generate_content))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind fake gemini");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake gemini crashed");
    });

    let base = Url::parse(&format!("http://{addr}/")).expect("base url");
    (base, fake)
}

fn text_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"totalTokenCount": 42},
        "modelVersion": "gemini-2.0-flash"
    })
}

fn gemini_advisor(base: Url, key: Option<&str>) -> Arc<GeminiAdvisor> {
    Arc::new(GeminiAdvisor::new(
        reqwest::Client::new(),
        base,
        "gemini-2.0-flash",
        key.map(str::to_string),
        true,
    ))
}

async fn assess(advisor: Arc<GeminiAdvisor>, tag: &str) -> common::TestResponse {
    let temp = TempStore::new(tag).await;
    let app = app(Arc::new(temp.storage.clone()), advisor, Arc::new(StaticWeather));
    send(&app, "POST", "/api/land-assessment", Some(pune_request())).await
}

#[tokio::test]
async fn unreachable_provider_serves_rice_and_wheat_fallback() {
    // Nothing listens on the discard port.
    let base = Url::parse("http://127.0.0.1:9/").unwrap();
    let resp = assess(gemini_advisor(base, Some("test-key")), "unreachable").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, *FALLBACK_RECOMMENDATIONS);
    assert_eq!(resp.headers["x-recommendation-source"], "fallback");

    let crops: Vec<&str> = resp.body["recommendedCrops"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(crops, ["Rice", "Wheat"]);
}

#[tokio::test]
async fn prose_wrapped_model_json_is_returned_as_is() {
    let wrapped = format!(
        "Sure! Here are my recommendations:\n```json\n{}\n```\nHappy farming.",
        sample_payload()
    );
    let (base, fake) = spawn_fake_gemini(StatusCode::OK, text_reply(&wrapped)).await;

    let resp = assess(gemini_advisor(base, Some("test-key")), "model-ok").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, sample_payload());
    assert_eq!(resp.headers["x-recommendation-source"], "model");

    let seen = fake.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (key, body) = &seen[0];
    assert_eq!(key.as_deref(), Some("test-key"));
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("- Location: Pune, Maharashtra"));
    assert!(prompt.contains("- Weather Information: Current temperature: 28°C, Condition: Partly cloudy"));
}

#[tokio::test]
async fn unfamiliar_finish_reason_keeps_model_answer() {
    let mut reply = text_reply(&sample_payload().to_string());
    reply["candidates"][0]["finishReason"] = json!("MISSING_THOUGHT_SIGNATURE");
    let (base, _fake) = spawn_fake_gemini(StatusCode::OK, reply).await;

    let resp = assess(gemini_advisor(base, Some("test-key")), "new-finish-reason").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, sample_payload());
    assert_eq!(resp.headers["x-recommendation-source"], "model");
}

#[tokio::test]
async fn reply_without_json_object_falls_back() {
    let (base, _fake) = spawn_fake_gemini(
        StatusCode::OK,
        text_reply("I'm sorry, I can't provide recommendations for that location."),
    )
    .await;

    let resp = assess(gemini_advisor(base, Some("test-key")), "no-json").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, *FALLBACK_RECOMMENDATIONS);
    assert_eq!(resp.headers["x-recommendation-source"], "fallback");
}

#[tokio::test]
async fn upstream_error_and_empty_candidates_fall_back() {
    let (base, _fake) = spawn_fake_gemini(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"code": 429, "message": "Resource exhausted", "status": "RESOURCE_EXHAUSTED"}}),
    )
    .await;
    let resp = assess(gemini_advisor(base, Some("test-key")), "rate-limited").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, *FALLBACK_RECOMMENDATIONS);

    let (base, _fake) =
        spawn_fake_gemini(StatusCode::OK, json!({"promptFeedback": {"blockReason": "SAFETY"}})).await;
    let resp = assess(gemini_advisor(base, Some("test-key")), "blocked").await;
    assert_eq!(resp.body, *FALLBACK_RECOMMENDATIONS);
}

#[tokio::test]
async fn missing_key_never_reaches_the_provider() {
    let (base, fake) = spawn_fake_gemini(StatusCode::OK, text_reply("{}")).await;

    let resp = assess(gemini_advisor(base, None), "no-key").await;
    assert_eq!(resp.body, *FALLBACK_RECOMMENDATIONS);
    assert!(fake.seen.lock().unwrap().is_empty());
}
