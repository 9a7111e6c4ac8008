//! Client error types.

use std::fmt;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// An argument failed validation before anything was sent.
    InvalidArgument(String),
    /// A host reply did not have the expected shape.
    Response(String),
    /// A second listener was registered where only one is allowed.
    DuplicateListener(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Self::Response(msg) => write!(f, "unexpected response: {}", msg),
            Self::DuplicateListener(msg) => write!(f, "duplicate listener: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}
