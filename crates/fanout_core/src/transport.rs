//! Transport and endpoint selectors.

use fanout_error::UnsupportedTransportError;
use serde::{Deserialize, Serialize};

/// Protocol used to reach the inference server.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// JSON over HTTP/1.1
    Http,
    /// Protobuf over HTTP/2
    Grpc,
}

impl TransportKind {
    /// Parse a transport name, rejecting anything outside the supported set.
    #[track_caller]
    pub fn parse(kind: &str) -> Result<Self, UnsupportedTransportError> {
        match kind.trim().parse() {
            Ok(kind) => Ok(kind),
            Err(_) => Err(UnsupportedTransportError::new(kind)),
        }
    }
}

/// Server endpoint targeted by a batch.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EndpointMode {
    /// One request, one complete response payload
    Generate,
    /// One request, an incremental sequence of chunks
    #[default]
    GenerateStream,
}

impl EndpointMode {
    /// HTTP path for this endpoint.
    pub fn path(&self) -> &'static str {
        match self {
            EndpointMode::Generate => "/v1/generate",
            EndpointMode::GenerateStream => "/v1/generate_stream",
        }
    }

    /// Whether results arrive as chunks.
    pub fn is_streaming(&self) -> bool {
        matches!(self, EndpointMode::GenerateStream)
    }
}
