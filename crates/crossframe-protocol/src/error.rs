//! Protocol error types.
//!
//! Every variant here is a malformed-message condition: the input
//! violated the wire grammar. Decoding never silently produces a
//! corrupted bag; callers that tolerate garbage (the inbound message
//! handler does) log the error and drop the message.

use thiserror::Error;

/// Result type for wire operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors raised while decoding wire messages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// A pair is missing the `=` separating key from value.
    #[error("malformed pair `{pair}`: missing `=` separator")]
    MissingValueSeparator { pair: String },

    /// A value is missing the `:` separating type tag from content.
    #[error("malformed value for `{key}`: missing type tag")]
    MissingTypeTag { key: String },

    /// The type tag is not one of `s`, `b`, `a`.
    #[error("unknown type tag `{tag}` for key `{key}`")]
    UnknownTypeTag { key: String, tag: String },

    /// Percent-decoding produced invalid UTF-8.
    #[error("invalid percent-encoding in `{input}`")]
    InvalidEncoding { input: String },

    /// The message does not carry the API namespace prefix.
    #[error("missing `{expected}` namespace prefix")]
    MissingNamespace { expected: &'static str },

    /// A required field of the outer message bag is absent.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
}
