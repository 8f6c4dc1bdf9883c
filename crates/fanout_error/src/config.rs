//! Configuration error types.

/// Configuration failures detected before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// Model family has no known defaults
    #[display("Unknown model family: {_0}")]
    UnknownModel(String),
    /// Parameter is not recognised for this model family
    #[display("Unknown generation parameter '{name}' for model '{model}'")]
    UnknownParameter {
        /// Model family name
        model: String,
        /// Offending parameter name
        name: String,
    },
    /// Parameter has the wrong type or is out of range
    #[display("Invalid value for '{name}': {reason}")]
    InvalidParameter {
        /// Offending parameter name
        name: String,
        /// Why the value was rejected
        reason: String,
    },
    /// Settings could not be loaded or deserialized
    #[display("Failed to load settings: {_0}")]
    Load(String),
    /// Prompt source could not be read or parsed
    #[display("Failed to load prompts: {_0}")]
    Prompts(String),
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use fanout_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::UnknownModel("gpt-9".into()));
/// assert!(err.to_string().contains("gpt-9"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    line: u32,
    file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given kind at the current location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}
