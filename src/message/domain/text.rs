//! Validated message text.

use super::MessageDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum message length in characters, matching the `VARCHAR(256)` column.
pub const MAX_TEXT_LENGTH: usize = 256;

/// Trimmed, non-empty message text of at most [`MAX_TEXT_LENGTH`] characters.
///
/// Deserialisation runs the same validation as [`MessageText::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageText(String);

impl MessageText {
    /// Creates validated message text.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns [`MessageDomainError::EmptyText`] when nothing remains after
    /// trimming, or [`MessageDomainError::TextTooLong`] when the trimmed text
    /// exceeds [`MAX_TEXT_LENGTH`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, MessageDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(MessageDomainError::EmptyText);
        }

        let length = trimmed.chars().count();
        if length > MAX_TEXT_LENGTH {
            return Err(MessageDomainError::TextTooLong {
                actual: length,
                limit: MAX_TEXT_LENGTH,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the text as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the owned text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = MessageDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessageText> for String {
    fn from(text: MessageText) -> Self {
        text.0
    }
}

impl AsRef<str> for MessageText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
