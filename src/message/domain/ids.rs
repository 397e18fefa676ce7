//! Identifier types for the message domain.

use super::MessageDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Store-assigned surrogate identifier of a persisted message.
///
/// Identifiers increase monotonically with insertion order and are never
/// reused, so ordering by identifier gives newest-first listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(i64);

impl MessageId {
    /// Wraps a raw identifier read from the store.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the player who submitted a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Creates a player identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses the hyphenated UUID form used by the game session.
    ///
    /// # Errors
    ///
    /// Returns [`MessageDomainError::InvalidPlayerId`] when the value is not a
    /// hyphenated UUID.
    pub fn parse(value: &str) -> Result<Self, MessageDomainError> {
        let trimmed = value.trim();
        if trimmed.len() != uuid::fmt::Hyphenated::LENGTH {
            return Err(MessageDomainError::InvalidPlayerId(value.to_owned()));
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| MessageDomainError::InvalidPlayerId(value.to_owned()))
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl FromStr for PlayerId {
    type Err = MessageDomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl AsRef<Uuid> for PlayerId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
