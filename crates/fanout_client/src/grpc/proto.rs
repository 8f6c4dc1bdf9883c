//! Protobuf messages for the generation and health services.

pub(crate) const GENERATE_PATH: &str = "/fanout.v1.Generation/Generate";
pub(crate) const GENERATE_STREAM_PATH: &str = "/fanout.v1.Generation/GenerateStream";
pub(crate) const HEALTH_CHECK_PATH: &str = "/grpc.health.v1.Health/Check";

/// `grpc.health.v1.HealthCheckResponse.ServingStatus.SERVING`
pub(crate) const SERVING: i32 = 1;

#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct GenerateRequest {
    #[prost(string, tag = "1")]
    pub prompt: String,
    /// JSON-encoded generation parameters
    #[prost(string, tag = "2")]
    pub llm_config: String,
    #[prost(string, optional, tag = "3")]
    pub adapter_name: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct GenerateReply {
    #[prost(string, tag = "1")]
    pub text: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct HealthCheckRequest {
    #[prost(string, tag = "1")]
    pub service: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct HealthCheckResponse {
    #[prost(int32, tag = "1")]
    pub status: i32,
}
