//! Error types for Solidafy Change Stream
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Failures raised by a cursor fetch are carried as [`CursorFailure`] and
//! surface unchanged through [`Error::Cursor`]; only those are eligible for
//! resume classification (see [`crate::classify`]).

use thiserror::Error;

/// A failure raised by the underlying cursor while rewinding or advancing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorFailure {
    /// The server could not be reached, or the connection dropped mid-operation
    #[error("Connection failure: {message}")]
    Connection { message: String, code: Option<i32> },

    /// The server answered with an error document
    #[error("Server error {code}: {message}")]
    Server { code: i32, message: String },

    /// Anything raised locally by the cursor (misuse, programming errors)
    #[error("Cursor error: {message}")]
    Local { message: String },
}

impl CursorFailure {
    /// Create a connection-level failure
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            code: None,
        }
    }

    /// Create a connection-level failure that carries an error code
    pub fn connection_with_code(code: i32, message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            code: Some(code),
        }
    }

    /// Create a server-reported failure
    pub fn server(code: i32, message: impl Into<String>) -> Self {
        Self::Server {
            code,
            message: message.into(),
        }
    }

    /// Create a local failure
    pub fn local(message: impl Into<String>) -> Self {
        Self::Local {
            message: message.into(),
        }
    }

    /// Error code attached to the failure, if any
    pub fn code(&self) -> Option<i32> {
        match self {
            CursorFailure::Server { code, .. } => Some(*code),
            CursorFailure::Connection { code, .. } => *code,
            CursorFailure::Local { .. } => None,
        }
    }
}

/// The main error type for Solidafy Change Stream
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Change Document Errors
    // ============================================================================
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Resume token not found in change document")]
    ResumeTokenMissing,

    #[error("Expected resume token to have type \"document\" but found \"{found}\"")]
    ResumeTokenInvalidType { found: String },

    // ============================================================================
    // Cursor Errors
    // ============================================================================
    #[error(transparent)]
    Cursor(#[from] CursorFailure),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to convert to BSON: {0}")]
    BsonSer(#[from] bson::ser::Error),

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Check if this error may be recovered from by resuming the stream
    pub fn is_resumable(&self) -> bool {
        match self {
            Error::Cursor(failure) => crate::classify::is_resumable(failure),
            _ => false,
        }
    }

    /// The cursor failure carried by this error, if any
    pub fn as_cursor_failure(&self) -> Option<&CursorFailure> {
        match self {
            Error::Cursor(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Result type alias for Solidafy Change Stream
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
