//! Error types for reply dispatch.
//!
//! Every error here is scoped to a single protocol line. The dispatcher
//! reports them and carries on with the next line.

use std::num::ParseIntError;

use thiserror::Error;

/// Convenience type alias for Results using [`DispatchError`].
pub type Result<T, E = DispatchError> = std::result::Result<T, E>;

/// Errors raised while interpreting one server reply line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DispatchError {
    /// The reply code token was not a base-10 integer.
    #[error("malformed reply code: {token:?}")]
    MalformedCode {
        /// The raw code token.
        token: String,
        /// The underlying integer parse error.
        #[source]
        cause: ParseIntError,
    },

    /// A topic or WHO reply named a channel the session has not joined.
    #[error("no such channel: {0}")]
    ChannelNotFound(String),

    /// The line ended before a required field.
    #[error("missing field at index {index} (line has {len} tokens)")]
    MissingField {
        /// Index of the token that was requested.
        index: usize,
        /// Number of tokens actually present.
        len: usize,
    },

    /// A raw line could not be split into tokens.
    #[error("cannot tokenize line at position {position} while {context}: {input:?}")]
    Tokenize {
        /// The line as handed to the tokenizer.
        input: String,
        /// Byte offset where tokenizing stopped.
        position: usize,
        /// What the tokenizer was parsing at that point.
        context: &'static str,
    },

    /// A field was present but could not be interpreted.
    #[error("invalid {field}: {value:?}")]
    InvalidField {
        /// Name of the field.
        field: &'static str,
        /// The offending raw value.
        value: String,
    },
}

impl DispatchError {
    /// Whether the error concerns the line's shape rather than session state.
    pub fn is_malformed_line(&self) -> bool {
        matches!(
            self,
            DispatchError::MalformedCode { .. }
                | DispatchError::MissingField { .. }
                | DispatchError::Tokenize { .. }
                | DispatchError::InvalidField { .. }
        )
    }
}
