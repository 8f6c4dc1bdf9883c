//! Error types for the fanout inference client.
//!
//! Every error records the file and line where it was raised. Crate-specific
//! errors convert into [`FanoutError`] so binaries can use a single result type.

mod batch;
mod client;
mod config;
mod transport;

pub use batch::{BatchError, BatchErrorKind};
pub use client::{ClientError, ClientErrorKind, ClientResult};
pub use config::{ConfigError, ConfigErrorKind};
pub use transport::UnsupportedTransportError;

/// Crate-level error variants.
#[derive(Debug, derive_more::From, derive_more::Display)]
pub enum FanoutErrorKind {
    /// Unknown transport requested from the client factory
    #[display("{_0}")]
    Transport(UnsupportedTransportError),
    /// Client construction or request failure
    #[display("{_0}")]
    Client(ClientError),
    /// Invalid settings, generation parameters, or prompts
    #[display("{_0}")]
    Config(ConfigError),
    /// Batch-level failure
    #[display("{_0}")]
    Batch(BatchError),
}

/// Fanout error with kind discrimination.
#[derive(Debug)]
pub struct FanoutError(Box<FanoutErrorKind>);

impl FanoutError {
    /// Create a new error from a kind.
    pub fn new(kind: FanoutErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FanoutErrorKind {
        &self.0
    }
}

impl std::fmt::Display for FanoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fanout Error: {}", self.0)
    }
}

impl std::error::Error for FanoutError {}

// Generic From implementation for any type that converts to FanoutErrorKind
impl<T> From<T> for FanoutError
where
    T: Into<FanoutErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for fanout operations.
pub type FanoutResult<T> = std::result::Result<T, FanoutError>;
