//! Error types for the wrapper library

use std::fmt;

pub type Result<T> = std::result::Result<T, WrapperError>;

#[derive(Debug, thiserror::Error)]
pub enum WrapperError {
    /// Invalid options passed to a manager or wrapper constructor
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// A logged or cached value could not be represented as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File sink error with path
    #[error("File sink error for '{path}': {message}")]
    FileSink { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotation { path: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    Writer(String),

    /// Formatter error with format type
    #[error("Formatter error ({format_type}): {message}")]
    Formatter {
        format_type: String,
        message: String,
    },
}

impl WrapperError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        WrapperError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        WrapperError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a file sink error
    pub fn file_sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        WrapperError::FileSink {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        WrapperError::FileRotation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        WrapperError::Formatter {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        WrapperError::Writer(msg.into())
    }

    /// True for errors raised while validating options
    pub fn is_configuration(&self) -> bool {
        matches!(self, WrapperError::InvalidConfiguration { .. })
    }

    /// True for errors raised while turning a value into JSON
    pub fn is_serialization(&self) -> bool {
        matches!(self, WrapperError::Serialization(_))
    }
}

/// Error returned by a logged call
///
/// Keeps the wrapped function's own error apart from failures of the logging
/// machinery, so the former reaches the caller unchanged.
#[derive(Debug)]
pub enum CallError<E> {
    /// The wrapped function failed; the value is its original error
    Function(E),
    /// The call record could not be formatted or written
    Logging(WrapperError),
}

impl<E> CallError<E> {
    /// Returns the wrapped function's error, if that is what failed
    pub fn into_function_error(self) -> Option<E> {
        match self {
            CallError::Function(e) => Some(e),
            CallError::Logging(_) => None,
        }
    }

    pub fn is_logging(&self) -> bool {
        matches!(self, CallError::Logging(_))
    }
}

impl<E: fmt::Display> fmt::Display for CallError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Function(e) => write!(f, "{}", e),
            CallError::Logging(e) => write!(f, "logging failed: {}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for CallError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CallError::Function(e) => Some(e),
            CallError::Logging(e) => Some(e),
        }
    }
}

impl<E> From<WrapperError> for CallError<E> {
    fn from(err: WrapperError) -> Self {
        CallError::Logging(err)
    }
}
