//! HTTP client for the `/v1/generate` and `/v1/generate_stream` endpoints.

use super::{classify, stream::chunk_stream};
use crate::address;
use async_trait::async_trait;
use fanout_core::{EndpointMode, GenerationRequest, TransportKind};
use fanout_error::{ClientError, ClientErrorKind, ClientResult};
use fanout_interface::{ChunkStream, GenerationClient};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, Url};
use std::time::Duration;
use tracing::{debug, error, instrument};

const JSON: &str = "application/json";
const EVENT_STREAM: &str = "text/event-stream";
const READINESS_PATH: &str = "/readyz";

/// Client for an inference server speaking JSON over HTTP.
///
/// Cloning is cheap; clones share one connection pool, so a whole batch can
/// run over a single `HttpClient`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    address: String,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// No request is sent; the connection pool fills on first use.
    ///
    /// # Arguments
    ///
    /// * `address` - Server base URL, e.g. `http://localhost:3000`
    /// * `timeout` - Connect timeout and total per-request timeout
    ///
    /// # Errors
    ///
    /// Returns [`ClientErrorKind::InvalidAddress`] if the address cannot be parsed.
    #[instrument]
    pub fn new(address: &str, timeout: Duration) -> ClientResult<Self> {
        let base_url = address::base_url(address)?;
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ClientError::new(ClientErrorKind::Connection(format!(
                    "Failed to build HTTP client: {e}"
                )))
            })?;

        debug!(url = %base_url, "Created HTTP client");

        Ok(Self {
            client,
            base_url,
            address: address.to_string(),
            timeout,
        })
    }

    /// Returns the configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn post(&self, mode: EndpointMode, request: &GenerationRequest) -> ClientResult<Response> {
        let url = address::endpoint(&self.base_url, mode.path())?;
        let body = serde_json::to_vec(request)
            .map_err(|e| ClientError::new(ClientErrorKind::Encode(e.to_string())))?;

        debug!(url = %url, bytes = body.len(), "Sending request");

        let response = self
            .client
            .post(url)
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                classify(e)
            })?;

        ensure_success(response).await
    }
}

async fn ensure_success(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    error!(status = %status, error = %message, "Server returned error status");
    Err(ClientError::new(ClientErrorKind::Status {
        status: status.as_u16(),
        message,
    }))
}

#[async_trait]
impl GenerationClient for HttpClient {
    #[instrument(skip(self, request), fields(transport = "http", endpoint = "generate"))]
    async fn generate(&self, request: &GenerationRequest) -> ClientResult<String> {
        let response = self.post(EndpointMode::Generate, request).await?;
        let bytes = response.bytes().await.map_err(classify)?;

        debug!(bytes = bytes.len(), "Received response");

        String::from_utf8(bytes.to_vec()).map_err(|e| {
            ClientError::new(ClientErrorKind::ResponseDecode(format!(
                "response body is not valid UTF-8: {e}"
            )))
        })
    }

    #[instrument(skip(self, request), fields(transport = "http", endpoint = "generate_stream"))]
    async fn generate_stream(&self, request: &GenerationRequest) -> ClientResult<ChunkStream> {
        let response = self.post(EndpointMode::GenerateStream, request).await?;
        let framed = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(EVENT_STREAM));
        debug!(framed, "Stream opened");
        Ok(chunk_stream(response.bytes_stream(), framed))
    }

    #[instrument(skip(self), fields(transport = "http"))]
    async fn health(&self) -> ClientResult<()> {
        let url = address::endpoint(&self.base_url, READINESS_PATH)?;
        let response = self.client.get(url).send().await.map_err(classify)?;
        ensure_success(response).await?;
        debug!("Server is ready");
        Ok(())
    }

    fn transport(&self) -> TransportKind {
        TransportKind::Http
    }

    fn address(&self) -> &str {
        &self.address
    }
}
