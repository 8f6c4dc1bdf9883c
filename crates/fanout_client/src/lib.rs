//! Transports for the fanout inference client.
//!
//! [`create_client`] picks a transport by name and returns a [`ClientHandle`]
//! implementing [`fanout_interface::GenerationClient`]:
//!
//! * [`HttpClient`] posts JSON to `/v1/generate` and `/v1/generate_stream`
//! * [`GrpcClient`] calls the `fanout.v1.Generation` service

mod address;
mod factory;
mod grpc;
mod http;

pub use factory::{ClientHandle, DEFAULT_TIMEOUT, create_client};
pub use grpc::GrpcClient;
pub use http::HttpClient;
