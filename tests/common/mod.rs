//! In-process stand-ins for the chat gateway, dictionary API and oEmbed
//! endpoint, served from one local axum server.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lecturemate::config::{Config, GatewayConfig};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpListener;

pub const TEST_KEY: &str = "test-key";
pub const TEST_MODEL: &str = "test-model";

pub const CARDS_JSON: &str = r#"[{"question":"What does the borrow checker enforce?","answer":"Aliasing XOR mutability"},{"question":"What is a lifetime?","answer":"A region of code"}]"#;

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base URL nothing is listening on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

// ============================================================================
// Fake Chat Gateway
// ============================================================================

fn completion(content: Value) -> Response {
    Json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
    .into_response()
}

/// Behaviour is selected by a marker word in the user prompt.
async fn fake_gateway(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let expected = format!("Bearer {}", TEST_KEY);
    if headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, "bad key").into_response();
    }

    let system = body["messages"][0]["content"].as_str().unwrap_or_default().to_string();
    let user = body["messages"][1]["content"].as_str().unwrap_or_default().to_string();

    if user.contains("RATELIMIT") {
        return (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response();
    }
    if user.contains("NOCREDITS") {
        return (StatusCode::PAYMENT_REQUIRED, "pay up").into_response();
    }
    if user.contains("EXPLODE") {
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response();
    }
    if user.contains("EMPTY") {
        return Json(json!({"choices": []})).into_response();
    }
    if user.contains("SLOW") {
        tokio::time::sleep(Duration::from_secs(3)).await;
    }
    if user.contains("NOTJSON") {
        return completion(json!("I'd rather write an essay."));
    }
    if user.contains("FENCED") {
        return completion(json!(format!("```json\n{}\n```", CARDS_JSON)));
    }
    if system.contains("flashcards") {
        return completion(json!(CARDS_JSON));
    }

    completion(json!(format!("model={} | {}", body["model"].as_str().unwrap_or_default(), user)))
}

// ============================================================================
// Fake Dictionary and oEmbed
// ============================================================================

async fn fake_dictionary(Path(word): Path<String>) -> Response {
    match word.as_str() {
        "zzzz" => (StatusCode::NOT_FOUND, Json(json!({"title": "No Definitions Found"}))).into_response(),
        "teapot" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "nothing" => Json(json!([])).into_response(),
        "garbled" => "<html>".into_response(),
        _ => Json(json!([{
            "word": word,
            "phonetic": "/test/",
            "phonetics": [{"text": "/test/", "audio": ""}],
            "meanings": [{
                "partOfSpeech": "noun",
                "definitions": [{"definition": format!("Definition of {}", word), "synonyms": []}]
            }]
        }]))
        .into_response(),
    }
}

async fn fake_oembed(Query(params): Query<HashMap<String, String>>) -> Response {
    let url = params.get("url").cloned().unwrap_or_default();
    if params.get("format").map(String::as_str) != Some("json") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    if url.contains("notitle") {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({"title": format!("Title for {}", url)})).into_response()
}

pub fn upstream_router() -> Router {
    Router::new()
        .route("/v1/chat/completions", post(fake_gateway))
        .route("/entries/{word}", get(fake_dictionary))
        .route("/oembed", get(fake_oembed))
}

/// Configuration pointing every outbound client at `upstream`.
pub fn test_config(upstream: &str) -> Config {
    Config {
        gateway: GatewayConfig {
            url: format!("{}/v1/chat/completions", upstream),
            api_key: Some(TEST_KEY.to_string()),
            model: TEST_MODEL.to_string(),
        },
        request_timeout: Duration::from_secs(1),
        dictionary_url: format!("{}/entries", upstream),
        oembed_url: format!("{}/oembed", upstream),
        ..Config::default()
    }
}
