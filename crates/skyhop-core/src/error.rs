//! Error types for Skyhop.

use thiserror::Error;

/// Failure talking to the flight data source.
///
/// Always recoverable from the engine's point of view: a failed fetch only
/// reschedules the next tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response (connect, TLS, timeout, body read).
    #[error("transport error: {message}")]
    Transport { message: String, timed_out: bool },

    /// The source answered with a non-success status other than "not found".
    #[error("HTTP {status} from flight source: {message}")]
    Status { status: u16, message: String },

    /// The response body did not match the departures schema.
    #[error("decode error: {message}")]
    Decode { message: String },
}

impl GatewayError {
    /// Build a transport error from any displayable cause.
    pub fn transport(message: impl Into<String>) -> Self {
        GatewayError::Transport {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Returns true if the request hit the client timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Transport { timed_out: true, .. })
    }

    /// HTTP status code, if the source responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Main error type for Skyhop operations.
#[derive(Error, Debug, Clone)]
pub enum SkyhopError {
    /// A required setting is missing or malformed.
    #[error("Configuration error ({key}): {message}")]
    Configuration { key: String, message: String },

    /// Persisted traveler state is unusable.
    #[error("State error: {message}")]
    StateError { message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl SkyhopError {
    /// Shorthand for a missing or invalid configuration key.
    pub fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        SkyhopError::Configuration {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Convenience Result type for Skyhop operations.
pub type Result<T> = std::result::Result<T, SkyhopError>;

impl From<serde_json::Error> for SkyhopError {
    fn from(err: serde_json::Error) -> Self {
        SkyhopError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for SkyhopError {
    fn from(err: std::io::Error) -> Self {
        SkyhopError::Io(err.to_string())
    }
}
