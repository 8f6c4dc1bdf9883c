//! Core data types for the fanout inference client.
//!
//! This crate provides the request, configuration and result types shared by
//! the transports and the dispatcher.

mod chunk;
mod config;
mod request;
mod result;
mod transport;

pub use chunk::{Chunk, extract_text};
pub use config::{GenerationConfig, ModelFamily};
pub use request::{GenerationRequest, GenerationRequestBuilder, GenerationRequestBuilderError};
pub use result::{GenerationOutput, GenerationResult, GenerationStatus};
pub use transport::{EndpointMode, TransportKind};
