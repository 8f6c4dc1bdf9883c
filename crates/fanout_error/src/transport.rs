//! Transport selection error types.

/// Raised when a client is requested for a transport outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Error)]
#[display(
    "Unsupported transport '{}': only 'http' and 'grpc' are supported (at line {} in {})",
    kind,
    line,
    file
)]
pub struct UnsupportedTransportError {
    /// The transport name that was requested
    pub kind: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl UnsupportedTransportError {
    /// Create a new UnsupportedTransportError for the given transport name.
    ///
    /// # Examples
    ///
    /// ```
    /// use fanout_error::UnsupportedTransportError;
    ///
    /// let err = UnsupportedTransportError::new("carrier-pigeon");
    /// assert_eq!(err.kind, "carrier-pigeon");
    /// assert!(err.to_string().contains("only 'http' and 'grpc'"));
    /// ```
    #[track_caller]
    pub fn new(kind: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind: kind.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
