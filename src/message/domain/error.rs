//! Error types for message domain validation.

use thiserror::Error;

/// Errors returned while constructing message domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessageDomainError {
    /// The message text is empty after trimming.
    #[error("message text must not be empty")]
    EmptyText,

    /// The message text exceeds the 256-character storage limit.
    #[error("message text has {actual} characters, exceeds limit of {limit}")]
    TextTooLong {
        /// Character count of the rejected text.
        actual: usize,
        /// Maximum accepted character count.
        limit: usize,
    },

    /// The player identifier is not a hyphenated UUID.
    #[error("invalid player identifier '{0}'")]
    InvalidPlayerId(String),
}
