//! In-process gRPC generation and health server.

use futures_util::stream::{self, BoxStream, StreamExt};
use serde_json::{Value, json};
use std::convert::Infallible;
use std::task::{Context, Poll};
use std::time::Duration;
use tonic::body::BoxBody;
use tonic::codec::ProstCodec;
use tonic::codegen::{Body, BoxFuture, Service, StdError, empty_body, http};
use tonic::server::{Grpc, NamedService, ServerStreamingService, UnaryService};
use tonic::transport::Server;
use tonic::transport::server::TcpIncoming;
use tonic::{Request, Response, Status};

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GenerateRequest {
    #[prost(string, tag = "1")]
    pub prompt: String,
    #[prost(string, tag = "2")]
    pub llm_config: String,
    #[prost(string, optional, tag = "3")]
    pub adapter_name: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GenerateReply {
    #[prost(string, tag = "1")]
    pub text: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HealthCheckRequest {
    #[prost(string, tag = "1")]
    pub service: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HealthCheckResponse {
    #[prost(int32, tag = "1")]
    pub status: i32,
}

const SERVING: i32 = 1;
const NOT_SERVING: i32 = 2;

/// How the mock server answers.
#[derive(Debug, Clone, Copy)]
pub struct GrpcBehavior {
    /// Pause before every generation reply
    pub delay: Duration,
    /// Health status reported by `Check`
    pub serving: bool,
}

impl Default for GrpcBehavior {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            serving: true,
        }
    }
}

/// Serve the generation and health services on an ephemeral local port.
pub async fn spawn_grpc(behavior: GrpcBehavior) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock grpc server");
    let addr = listener.local_addr().expect("mock grpc server address");
    let incoming = TcpIncoming::from_listener(listener, true, None).expect("incoming connections");
    tokio::spawn(async move {
        Server::builder()
            .add_service(GenerationService { behavior })
            .add_service(HealthService { behavior })
            .serve_with_incoming(incoming)
            .await
            .expect("mock grpc server");
    });
    format!("http://{addr}")
}

/// Reply for a unary call: the echoed prompt plus the request fields as received.
fn echo_reply(request: &GenerateRequest) -> GenerateReply {
    let llm_config = serde_json::from_str::<Value>(&request.llm_config).unwrap_or(Value::Null);
    let text = json!({
        "text": format!("{} echoed", request.prompt),
        "llm_config": llm_config,
        "adapter_name": request.adapter_name,
    });
    GenerateReply {
        text: text.to_string(),
    }
}

struct Generate(GrpcBehavior);

impl UnaryService<GenerateRequest> for Generate {
    type Response = GenerateReply;
    type Future = BoxFuture<Response<GenerateReply>, Status>;

    fn call(&mut self, request: Request<GenerateRequest>) -> Self::Future {
        let delay = self.0.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(Response::new(echo_reply(request.get_ref())))
        })
    }
}

struct GenerateStream(GrpcBehavior);

impl ServerStreamingService<GenerateRequest> for GenerateStream {
    type Response = GenerateReply;
    type ResponseStream = BoxStream<'static, Result<GenerateReply, Status>>;
    type Future = BoxFuture<Response<Self::ResponseStream>, Status>;

    fn call(&mut self, request: Request<GenerateRequest>) -> Self::Future {
        let delay = self.0.delay;
        let prompt = request.into_inner().prompt;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            let replies = vec![prompt, " echoed".to_string()]
                .into_iter()
                .map(|text| Ok(GenerateReply { text }));
            Ok(Response::new(stream::iter(replies).boxed()))
        })
    }
}

struct Check(GrpcBehavior);

impl UnaryService<HealthCheckRequest> for Check {
    type Response = HealthCheckResponse;
    type Future = BoxFuture<Response<HealthCheckResponse>, Status>;

    fn call(&mut self, _request: Request<HealthCheckRequest>) -> Self::Future {
        let status = if self.0.serving { SERVING } else { NOT_SERVING };
        Box::pin(async move { Ok(Response::new(HealthCheckResponse { status })) })
    }
}

fn unimplemented() -> http::Response<BoxBody> {
    let mut response = http::Response::new(empty_body());
    let headers = response.headers_mut();
    headers.insert(
        "grpc-status",
        http::HeaderValue::from(tonic::Code::Unimplemented as i32),
    );
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/grpc"),
    );
    response
}

#[derive(Debug, Clone)]
struct GenerationService {
    behavior: GrpcBehavior,
}

impl NamedService for GenerationService {
    const NAME: &'static str = "fanout.v1.Generation";
}

impl<B> Service<http::Request<B>> for GenerationService
where
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<BoxBody>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let behavior = self.behavior;
        match req.uri().path() {
            "/fanout.v1.Generation/Generate" => Box::pin(async move {
                let mut grpc = Grpc::new(ProstCodec::<GenerateReply, GenerateRequest>::default());
                Ok(grpc.unary(Generate(behavior), req).await)
            }),
            "/fanout.v1.Generation/GenerateStream" => Box::pin(async move {
                let mut grpc = Grpc::new(ProstCodec::<GenerateReply, GenerateRequest>::default());
                Ok(grpc.server_streaming(GenerateStream(behavior), req).await)
            }),
            _ => Box::pin(async { Ok(unimplemented()) }),
        }
    }
}

#[derive(Debug, Clone)]
struct HealthService {
    behavior: GrpcBehavior,
}

impl NamedService for HealthService {
    const NAME: &'static str = "grpc.health.v1.Health";
}

impl<B> Service<http::Request<B>> for HealthService
where
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<BoxBody>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let behavior = self.behavior;
        match req.uri().path() {
            "/grpc.health.v1.Health/Check" => Box::pin(async move {
                let mut grpc =
                    Grpc::new(ProstCodec::<HealthCheckResponse, HealthCheckRequest>::default());
                Ok(grpc.unary(Check(behavior), req).await)
            }),
            _ => Box::pin(async { Ok(unimplemented()) }),
        }
    }
}
