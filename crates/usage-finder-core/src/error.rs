//! Error types for the usage finder

use thiserror::Error;

/// Result type alias for usage finder operations
pub type FinderResult<T> = Result<T, FinderError>;

/// Main error type for the usage finder
///
/// Every variant other than `InvalidInput` is fatal to a running search: it
/// triggers process group termination and propagates to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FinderError {
    /// Bad arguments, detected before any search starts
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An external program could not be started
    #[error("Failed to spawn `{program}`: {message}")]
    Spawn { program: String, message: String },

    /// An external program exited with a status it is not allowed to
    #[error("`{command}` exited with {status}")]
    ProcessFailed { command: String, status: String },

    /// Structured search output could not be decoded
    #[error("Unparseable search output: {0}")]
    UnparseableOutput(String),

    /// A raw match violated a structural assumption
    #[error("Malformed match: {0}")]
    MalformedMatch(String),

    /// No library is known for a language and component prefix
    #[error("No {language} library known for component `{component}`")]
    UnknownLibrary { language: String, component: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl FinderError {
    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a new spawn error
    pub fn spawn(program: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Spawn {
            program: program.into(),
            message: error.to_string(),
        }
    }

    /// Create a new process failure error
    pub fn process_failed(command: impl Into<String>, status: impl std::fmt::Display) -> Self {
        Self::ProcessFailed {
            command: command.into(),
            status: status.to_string(),
        }
    }

    /// Create a new unparseable output error
    pub fn unparseable(message: impl Into<String>) -> Self {
        Self::UnparseableOutput(message.into())
    }

    /// Create a new malformed match error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMatch(message.into())
    }

    /// Whether the error was raised before any work started
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

impl From<std::io::Error> for FinderError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for FinderError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}
