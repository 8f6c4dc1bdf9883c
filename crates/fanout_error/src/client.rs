//! Per-request client error types.

/// Specific failure conditions for a single generation request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ClientErrorKind {
    /// Server address could not be parsed into a usable endpoint
    #[display("Invalid server address: {_0}")]
    InvalidAddress(String),
    /// Request could not be encoded for the wire
    #[display("Failed to encode request: {_0}")]
    Encode(String),
    /// Transport could not reach the server
    #[display("Connection failed: {_0}")]
    Connection(String),
    /// Response body was malformed or not valid text
    #[display("Failed to decode response: {_0}")]
    ResponseDecode(String),
    /// Request exceeded the configured timeout
    #[display("Request timed out: {_0}")]
    Timeout(String),
    /// Server answered with a non-success status
    #[display("Server returned status {status}: {message}")]
    Status {
        /// HTTP status code, or gRPC status code
        status: u16,
        /// Response body or status message
        message: String,
    },
}

impl ClientErrorKind {
    /// Short, stable label used in reports and structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            ClientErrorKind::InvalidAddress(_) => "invalid_address",
            ClientErrorKind::Encode(_) => "encode",
            ClientErrorKind::Connection(_) => "connection",
            ClientErrorKind::ResponseDecode(_) => "decode",
            ClientErrorKind::Timeout(_) => "timeout",
            ClientErrorKind::Status { .. } => "status",
        }
    }
}

/// Client error with source location tracking.
///
/// # Examples
///
/// ```
/// use fanout_error::{ClientError, ClientErrorKind};
///
/// let err = ClientError::new(ClientErrorKind::Timeout("30s elapsed".into()));
/// assert_eq!(err.kind().label(), "timeout");
/// assert!(err.to_string().contains("30s elapsed"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Error)]
#[display("Client Error: {} at line {} in {}", kind, line, file)]
pub struct ClientError {
    kind: ClientErrorKind,
    line: u32,
    file: &'static str,
}

impl ClientError {
    /// Create a new client error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ClientErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ClientErrorKind {
        &self.kind
    }

    /// Line number where the error was raised.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// File where the error was raised.
    pub fn file(&self) -> &'static str {
        self.file
    }
}

/// Result type for per-request client operations.
pub type ClientResult<T> = Result<T, ClientError>;
