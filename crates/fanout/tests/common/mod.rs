//! Shared fixtures: a scripted in-memory client and an axum echo server.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use fanout_core::{Chunk, GenerationRequest, TransportKind};
use fanout_error::{ClientError, ClientErrorKind, ClientResult};
use fanout_interface::{ChunkStream, GenerationClient};
use futures_util::StreamExt;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory client with per-prompt delays and failures.
///
/// Tracks how many requests are in flight at once and keeps every request it
/// receives.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    delay: Duration,
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    broken_streams: HashSet<String>,
    chunks: Vec<String>,
    active: AtomicUsize,
    peak: AtomicUsize,
    seen: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay applied to every request without its own delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_prompt_delay(mut self, prompt: &str, delay: Duration) -> Self {
        self.delays.insert(prompt.to_string(), delay);
        self
    }

    /// Requests for `prompt` fail with a connection error.
    pub fn failing(mut self, prompt: &str) -> Self {
        self.failing.insert(prompt.to_string());
        self
    }

    /// Streams for `prompt` break after their first chunk.
    pub fn breaking_stream(mut self, prompt: &str) -> Self {
        self.broken_streams.insert(prompt.to_string());
        self
    }

    /// Raw payloads every stream yields.
    pub fn with_chunks(mut self, chunks: &[&str]) -> Self {
        self.chunks = chunks.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Most requests observed in flight at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Every request received, in issue order.
    pub fn seen(&self) -> Vec<GenerationRequest> {
        self.seen.lock().expect("seen lock").clone()
    }

    async fn enter(&self, request: &GenerationRequest) -> ClientResult<()> {
        self.seen.lock().expect("seen lock").push(request.clone());
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(active, Ordering::SeqCst);

        let delay = self
            .delays
            .get(request.prompt())
            .copied()
            .unwrap_or(self.delay);
        tokio::time::sleep(delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(request.prompt()) {
            return Err(ClientError::new(ClientErrorKind::Connection(
                "connection refused".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, request: &GenerationRequest) -> ClientResult<String> {
        self.enter(request).await?;
        Ok(json!({ "text": format!("{} echoed", request.prompt()) }).to_string())
    }

    async fn generate_stream(&self, request: &GenerationRequest) -> ClientResult<ChunkStream> {
        self.enter(request).await?;
        let mut items: Vec<ClientResult<Chunk>> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(index, raw)| Ok(Chunk::from_payload(index, raw.as_str())))
            .collect();
        if self.broken_streams.contains(request.prompt()) {
            items.truncate(1);
            items.push(Err(ClientError::new(ClientErrorKind::ResponseDecode(
                "stream ended mid-record".to_string(),
            ))));
        }
        Ok(futures_util::stream::iter(items).boxed())
    }

    async fn health(&self) -> ClientResult<()> {
        Ok(())
    }

    fn transport(&self) -> TransportKind {
        TransportKind::Http
    }

    fn address(&self) -> &str {
        "scripted://local"
    }
}

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

fn prompt_of(body: &Value) -> String {
    body["prompt"].as_str().unwrap_or_default().to_string()
}

async fn echo(Json(body): Json<Value>) -> Result<Json<Value>, (StatusCode, String)> {
    let prompt = prompt_of(&body);
    if prompt == "fail" {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "generation failed".to_string()));
    }
    Ok(Json(json!({
        "text": format!("{prompt} echoed"),
        "llm_config": body["llm_config"].clone(),
        "adapter_name": body["adapter_name"].clone(),
    })))
}

async fn echo_stream(Json(body): Json<Value>) -> Body {
    let prompt = prompt_of(&body);
    let records = vec![
        Ok::<_, Infallible>(format!("data: {}\n\n", json!({ "text": prompt }))),
        Ok(format!("data: {}\n\n", json!({ "text": " echoed" }))),
        Ok("data: [DONE]\n\n".to_string()),
    ];
    Body::from_stream(futures_util::stream::iter(records))
}

/// Server echoing each prompt as `{"text": "<prompt> echoed"}` along with the
/// config and adapter it received. The prompt `fail` gets a 500.
pub fn echo_server() -> Router {
    Router::new()
        .route("/v1/generate", post(echo))
        .route("/v1/generate_stream", post(echo_stream))
        .route("/readyz", get(|| async { StatusCode::OK }))
}

/// Prompts as owned strings.
pub fn prompts(items: &[&str]) -> Vec<String> {
    items.iter().map(|p| p.to_string()).collect()
}
