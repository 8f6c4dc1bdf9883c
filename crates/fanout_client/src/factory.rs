//! Transport selection.

use crate::{GrpcClient, HttpClient};
use async_trait::async_trait;
use fanout_core::{GenerationRequest, TransportKind};
use fanout_error::{ClientResult, FanoutResult};
use fanout_interface::{ChunkStream, GenerationClient};
use std::time::Duration;
use tracing::{info, instrument};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An open session to the inference server over one of the supported transports.
///
/// Owns the connection pool (HTTP) or channel (gRPC). Release it with
/// [`ClientHandle::close`] once the batch that opened it is finished.
#[derive(Debug, Clone)]
pub enum ClientHandle {
    /// JSON over HTTP
    Http(HttpClient),
    /// Protobuf over gRPC
    Grpc(GrpcClient),
}

/// Create a client for `address` speaking the transport named by `kind`.
///
/// `kind` must be `http` or `grpc` (case-insensitive). It is validated before
/// anything touches the network.
///
/// # Errors
///
/// * [`fanout_error::UnsupportedTransportError`] for any other `kind`
/// * [`fanout_error::ClientErrorKind::InvalidAddress`] for an unparsable address
///
/// # Examples
///
/// ```
/// use fanout_client::{DEFAULT_TIMEOUT, create_client};
/// use fanout_error::FanoutErrorKind;
///
/// let err = create_client("http://localhost:3000", "carrier-pigeon", DEFAULT_TIMEOUT).unwrap_err();
/// assert!(matches!(err.kind(), FanoutErrorKind::Transport(_)));
/// ```
#[instrument(skip(timeout))]
pub fn create_client(address: &str, kind: &str, timeout: Duration) -> FanoutResult<ClientHandle> {
    let transport = TransportKind::parse(kind)?;
    Ok(ClientHandle::connect(address, transport, timeout)?)
}

impl ClientHandle {
    /// Build a client for an already-validated transport.
    pub fn connect(
        address: &str,
        transport: TransportKind,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let handle = match transport {
            TransportKind::Http => ClientHandle::Http(HttpClient::new(address, timeout)?),
            TransportKind::Grpc => ClientHandle::Grpc(GrpcClient::new(address, timeout)?),
        };
        info!(transport = %transport, address, "Client ready");
        Ok(handle)
    }

    /// Release the connection pool or channel.
    pub fn close(self) {
        info!(transport = %self.transport(), address = self.address(), "Closing client");
        drop(self);
    }

    fn inner(&self) -> &dyn GenerationClient {
        match self {
            ClientHandle::Http(client) => client,
            ClientHandle::Grpc(client) => client,
        }
    }
}

#[async_trait]
impl GenerationClient for ClientHandle {
    async fn generate(&self, request: &GenerationRequest) -> ClientResult<String> {
        self.inner().generate(request).await
    }

    async fn generate_stream(&self, request: &GenerationRequest) -> ClientResult<ChunkStream> {
        self.inner().generate_stream(request).await
    }

    async fn health(&self) -> ClientResult<()> {
        self.inner().health().await
    }

    fn transport(&self) -> TransportKind {
        self.inner().transport()
    }

    fn address(&self) -> &str {
        self.inner().address()
    }
}
