//! Batch-level error types.

/// Batch outcomes that escalate to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BatchErrorKind {
    /// Every request in a non-empty batch failed
    #[display("All {total} requests in the batch failed")]
    AllRequestsFailed {
        /// Number of requests submitted
        total: usize,
    },
}

/// Batch error with source location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Error)]
#[display("Batch Error: {} at line {} in {}", kind, line, file)]
pub struct BatchError {
    kind: BatchErrorKind,
    line: u32,
    file: &'static str,
}

impl BatchError {
    /// Create a new BatchError at the current location.
    #[track_caller]
    pub fn new(kind: BatchErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BatchErrorKind {
        &self.kind
    }
}
