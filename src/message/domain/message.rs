//! Message aggregate and its unsaved form.

use super::{MessageDomainError, MessageId, MessageText, PlayerId};
use serde::{Deserialize, Serialize};

/// A message that has not been stored yet and therefore has no identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    player_id: PlayerId,
    text: MessageText,
}

impl NewMessage {
    /// Creates an unsaved message from validated parts.
    #[must_use]
    pub const fn new(player_id: PlayerId, text: MessageText) -> Self {
        Self { player_id, text }
    }

    /// Validates raw submission input.
    ///
    /// # Errors
    ///
    /// Returns [`MessageDomainError`] when the player identifier or the text
    /// fails validation.
    pub fn parse(player_id: &str, text: impl Into<String>) -> Result<Self, MessageDomainError> {
        Ok(Self::new(PlayerId::parse(player_id)?, MessageText::new(text)?))
    }

    /// Returns the submitting player.
    #[must_use]
    pub const fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Returns the message text.
    #[must_use]
    pub const fn text(&self) -> &MessageText {
        &self.text
    }

    /// Attaches the identifier assigned by the store.
    #[must_use]
    pub fn into_stored(self, id: MessageId) -> Message {
        Message {
            id,
            player_id: self.player_id,
            text: self.text,
        }
    }
}

/// A persisted player message.
///
/// All fields are immutable once stored; there is no edit operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    player_id: PlayerId,
    text: MessageText,
}

impl Message {
    /// Returns the store-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the submitting player.
    #[must_use]
    pub const fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Returns the message text.
    #[must_use]
    pub const fn text(&self) -> &MessageText {
        &self.text
    }
}
