//! gRPC client for the `fanout.v1.Generation` service.

use super::{classify, elapsed, proto};
use crate::address;
use async_trait::async_trait;
use fanout_core::{Chunk, GenerationRequest, TransportKind};
use fanout_error::{ClientError, ClientErrorKind, ClientResult};
use fanout_interface::{ChunkStream, GenerationClient};
use std::time::Duration;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tokio::time::{Instant, timeout_at};
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, error, instrument};

/// Client for an inference server exposing the generation service over gRPC.
///
/// Requests from a whole batch are multiplexed as HTTP/2 streams over one
/// lazily-connected channel.
#[derive(Debug, Clone)]
pub struct GrpcClient {
    channel: Channel,
    address: String,
    timeout: Duration,
}

impl GrpcClient {
    /// Creates a new gRPC client.
    ///
    /// The channel connects on first use, so construction never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`ClientErrorKind::InvalidAddress`] if the address cannot be parsed.
    #[instrument]
    pub fn new(address: &str, timeout: Duration) -> ClientResult<Self> {
        let url = address::base_url(address)?;
        let origin = url.as_str().trim_end_matches('/').to_string();
        let endpoint = Endpoint::from_shared(origin.clone())
            .map_err(|e| {
                ClientError::new(ClientErrorKind::InvalidAddress(format!("{address}: {e}")))
            })?
            .connect_timeout(timeout);

        let channel = endpoint.connect_lazy();
        debug!(uri = %origin, "Created lazy gRPC channel");

        Ok(Self {
            channel,
            address: address.to_string(),
            timeout,
        })
    }

    /// Returns the configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn deadline(&self) -> Instant {
        Instant::now() + self.timeout
    }

    async fn ready(&self) -> ClientResult<Grpc<Channel>> {
        let mut grpc = Grpc::new(self.channel.clone());
        grpc.ready().await.map_err(|e| {
            error!(error = %e, "gRPC channel not ready");
            ClientError::new(ClientErrorKind::Connection(e.to_string()))
        })?;
        Ok(grpc)
    }

    fn message(&self, request: &GenerationRequest) -> ClientResult<tonic::Request<proto::GenerateRequest>> {
        let llm_config = request
            .config_json()
            .map_err(|e| ClientError::new(ClientErrorKind::Encode(e.to_string())))?;
        let mut message = tonic::Request::new(proto::GenerateRequest {
            prompt: request.prompt().clone(),
            llm_config,
            adapter_name: request.adapter_name().clone(),
        });
        message.set_timeout(self.timeout);
        Ok(message)
    }
}

#[async_trait]
impl GenerationClient for GrpcClient {
    #[instrument(skip(self, request), fields(transport = "grpc", endpoint = "generate"))]
    async fn generate(&self, request: &GenerationRequest) -> ClientResult<String> {
        let deadline = self.deadline();
        let message = self.message(request)?;
        let mut grpc = self.ready().await?;
        let codec = ProstCodec::<proto::GenerateRequest, proto::GenerateReply>::default();

        let call = grpc.unary(message, PathAndQuery::from_static(proto::GENERATE_PATH), codec);
        let response = timeout_at(deadline, call)
            .await
            .map_err(|_| elapsed(self.timeout))?
            .map_err(classify)?;

        let reply = response.into_inner();
        debug!(bytes = reply.text.len(), "Received response");
        Ok(reply.text)
    }

    #[instrument(skip(self, request), fields(transport = "grpc", endpoint = "generate_stream"))]
    async fn generate_stream(&self, request: &GenerationRequest) -> ClientResult<ChunkStream> {
        let deadline = self.deadline();
        let timeout = self.timeout;
        let message = self.message(request)?;
        let mut grpc = self.ready().await?;
        let codec = ProstCodec::<proto::GenerateRequest, proto::GenerateReply>::default();

        let call = grpc.server_streaming(
            message,
            PathAndQuery::from_static(proto::GENERATE_STREAM_PATH),
            codec,
        );
        let mut inbound = timeout_at(deadline, call)
            .await
            .map_err(|_| elapsed(timeout))?
            .map_err(classify)?
            .into_inner();

        debug!("Stream opened");
        // the deadline covers the whole stream, not each message
        Ok(Box::pin(async_stream::try_stream! {
            let mut index = 0;
            while let Some(reply) = timeout_at(deadline, inbound.message())
                .await
                .map_err(|_| elapsed(timeout))?
                .map_err(classify)?
            {
                yield Chunk::from_text(index, reply.text);
                index += 1;
            }
        }))
    }

    #[instrument(skip(self), fields(transport = "grpc"))]
    async fn health(&self) -> ClientResult<()> {
        let deadline = self.deadline();
        let mut grpc = self.ready().await?;
        let codec = ProstCodec::<proto::HealthCheckRequest, proto::HealthCheckResponse>::default();
        let mut message = tonic::Request::new(proto::HealthCheckRequest {
            service: String::new(),
        });
        message.set_timeout(self.timeout);

        let call = grpc.unary(message, PathAndQuery::from_static(proto::HEALTH_CHECK_PATH), codec);
        let response = timeout_at(deadline, call)
            .await
            .map_err(|_| elapsed(self.timeout))?
            .map_err(classify)?
            .into_inner();

        if response.status != proto::SERVING {
            return Err(ClientError::new(ClientErrorKind::Status {
                status: tonic::Code::Unavailable as u16,
                message: format!("health check reported serving status {}", response.status),
            }));
        }
        debug!("Server is ready");
        Ok(())
    }

    fn transport(&self) -> TransportKind {
        TransportKind::Grpc
    }

    fn address(&self) -> &str {
        &self.address
    }
}
