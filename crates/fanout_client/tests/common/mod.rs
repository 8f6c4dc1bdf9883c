//! In-process mock inference servers.

#![allow(dead_code)]

pub mod grpc;

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::convert::Infallible;
use std::time::Duration;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("mock server address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server");
    });
    format!("http://{addr}")
}

/// An address nothing is listening on.
pub async fn closed_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}")
}

fn prompt_of(body: &Value) -> String {
    body["prompt"].as_str().unwrap_or_default().to_string()
}

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "text": format!("{} echoed", prompt_of(&body)) }))
}

async fn echo_stream(Json(body): Json<Value>) -> Body {
    let prompt = prompt_of(&body);
    let records = vec![
        Ok::<_, Infallible>(format!("data: {}\n\n", json!({ "text": prompt }))),
        Ok(format!("data: {}\n\n", json!({ "text": " echoed" }))),
        Ok("data: [DONE]\n\n".to_string()),
        Ok(format!("data: {}\n\n", json!({ "text": "after done" }))),
    ];
    Body::from_stream(futures_util::stream::iter(records))
}

async fn plain_stream(Json(body): Json<Value>) -> Body {
    let prompt = prompt_of(&body);
    let records = vec![
        Ok::<_, Infallible>(format!("{}\n", json!({ "outputs": [{ "text": prompt }] }))),
        Ok(format!("{}", json!({ "outputs": [{ "text": "!" }] }))),
    ];
    Body::from_stream(futures_util::stream::iter(records))
}

async fn declared_event_stream(Json(body): Json<Value>) -> ([(&'static str, &'static str); 1], Body) {
    let prompt = prompt_of(&body);
    let records = vec![
        Ok::<_, Infallible>(": keep-alive\n\n".to_string()),
        Ok("event: message\n".to_string()),
        Ok(format!("data: {}\n\n", json!({ "text": prompt }))),
        Ok("data: [DONE]\n\n".to_string()),
    ];
    (
        [("content-type", "text/event-stream")],
        Body::from_stream(futures_util::stream::iter(records)),
    )
}

async fn capture(headers: HeaderMap, body: String) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    Json(json!({
        "accept": header("accept"),
        "content_type": header("content-type"),
        "body": serde_json::from_str::<Value>(&body).unwrap_or(Value::Null),
    }))
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(2)).await;
    "too late"
}

async fn unavailable() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "model is loading")
}

async fn not_utf8() -> Vec<u8> {
    vec![0xff, 0xfe, 0xfd]
}

async fn ready() -> StatusCode {
    StatusCode::OK
}

/// Server echoing each prompt as `{"text": "<prompt> echoed"}`.
pub fn echo_server() -> Router {
    Router::new()
        .route("/v1/generate", post(echo))
        .route("/v1/generate_stream", post(echo_stream))
        .route("/readyz", get(ready))
}

/// Server streaming newline-delimited JSON without event framing.
pub fn plain_stream_server() -> Router {
    Router::new().route("/v1/generate_stream", post(plain_stream))
}

/// Server declaring `text/event-stream` and opening with a keep-alive comment.
pub fn event_stream_server() -> Router {
    Router::new().route("/v1/generate_stream", post(declared_event_stream))
}

/// Server returning the request headers and decoded body.
pub fn capture_server() -> Router {
    Router::new().route("/v1/generate", post(capture))
}

/// Server that answers after two seconds.
pub fn slow_server() -> Router {
    Router::new()
        .route("/v1/generate", post(slow))
        .route("/v1/generate_stream", post(slow))
}

/// Server that always answers 503.
pub fn unavailable_server() -> Router {
    Router::new()
        .route("/v1/generate", post(unavailable))
        .route("/v1/generate_stream", post(unavailable))
        .route("/readyz", get(unavailable))
}

/// Server answering with bytes that are not UTF-8.
pub fn garbage_server() -> Router {
    Router::new()
        .route("/v1/generate", post(not_utf8))
        .route("/v1/generate_stream", post(not_utf8))
}
