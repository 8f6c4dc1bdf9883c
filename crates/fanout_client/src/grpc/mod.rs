//! Protobuf-over-gRPC transport.

mod client;
mod proto;

pub use client::GrpcClient;

use fanout_error::{ClientError, ClientErrorKind};
use std::error::Error as _;
use std::time::Duration;
use tonic::{Code, Status};

/// Map a gRPC status onto the client error taxonomy.
#[track_caller]
pub(crate) fn classify(status: Status) -> ClientError {
    let from_transport = std::iter::successors(status.source(), |&err| err.source())
        .any(|err| err.is::<tonic::transport::Error>());
    let message = status.message().to_string();
    let kind = match status.code() {
        _ if from_transport => ClientErrorKind::Connection(message),
        Code::DeadlineExceeded => ClientErrorKind::Timeout(message),
        // every call carries a deadline and is never cancelled by the client
        Code::Cancelled => ClientErrorKind::Timeout(message),
        Code::Unavailable => ClientErrorKind::Connection(message),
        Code::Internal if message.contains("decode") => ClientErrorKind::ResponseDecode(message),
        code => ClientErrorKind::Status {
            status: code as u16,
            message,
        },
    };
    ClientError::new(kind)
}

#[track_caller]
pub(crate) fn elapsed(timeout: Duration) -> ClientError {
    ClientError::new(ClientErrorKind::Timeout(format!(
        "no reply within {}ms",
        timeout.as_millis()
    )))
}
