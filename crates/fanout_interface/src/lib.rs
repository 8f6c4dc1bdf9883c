//! Trait definitions for the fanout inference client.
//!
//! [`GenerationClient`] is the capability every transport provides. The
//! dispatcher only ever talks to this trait.

use async_trait::async_trait;
use fanout_core::{Chunk, GenerationRequest, TransportKind};
use fanout_error::ClientResult;
use futures_util::stream::BoxStream;

/// Lazy, finite, non-restartable sequence of response chunks.
pub type ChunkStream = BoxStream<'static, ClientResult<Chunk>>;

/// Uniform generation interface over a transport.
///
/// Implementations must allow many concurrent calls through a shared
/// reference; the dispatcher multiplexes a whole batch over one client.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send one single-shot request and return the raw response body.
    async fn generate(&self, request: &GenerationRequest) -> ClientResult<String>;

    /// Send one streaming request.
    ///
    /// Returns once the server accepted the request; chunks are pulled from
    /// the returned stream.
    async fn generate_stream(&self, request: &GenerationRequest) -> ClientResult<ChunkStream>;

    /// Check that the server is ready to serve requests.
    async fn health(&self) -> ClientResult<()>;

    /// Transport this client speaks.
    fn transport(&self) -> TransportKind;

    /// Server address this client targets.
    fn address(&self) -> &str;
}
