//! JSON-over-HTTP transport.

mod client;
mod stream;

pub use client::HttpClient;

use fanout_error::{ClientError, ClientErrorKind};

/// Map a reqwest failure onto the client error taxonomy.
#[track_caller]
pub(crate) fn classify(err: reqwest::Error) -> ClientError {
    let message = describe(&err);
    let kind = if err.is_timeout() {
        ClientErrorKind::Timeout(message)
    } else if err.is_decode() || err.is_body() {
        ClientErrorKind::ResponseDecode(message)
    } else if err.is_builder() {
        ClientErrorKind::Encode(message)
    } else {
        ClientErrorKind::Connection(message)
    };
    ClientError::new(kind)
}

/// Render an error together with its source chain.
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
