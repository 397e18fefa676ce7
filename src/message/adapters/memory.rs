//! In-memory implementation of the [`MessageRepository`] port.
//!
//! Assigns identifiers from a monotonically increasing counter and never
//! reuses them after deletion, matching the store's `BIGSERIAL` behaviour.
//! Intended for tests and offline runs.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::message::{
    domain::{Message, MessageId, NewMessage, PlayerId},
    ports::{MessageRepository, MessageStoreError, MessageStoreResult},
};

/// Thread-safe in-memory message repository.
///
/// Clones share the same underlying storage.
///
/// # Example
///
/// ```
/// use craftmessage::message::adapters::memory::InMemoryMessageRepository;
///
/// let repo = InMemoryMessageRepository::new();
/// assert!(repo.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageRepository {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    messages: BTreeMap<MessageId, Message>,
    last_id: i64,
}

impl InMemoryMessageRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().map_or(0, |state| state.messages.len())
    }

    /// Returns `true` when no messages are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> MessageStoreResult<RwLockReadGuard<'_, InMemoryState>> {
        self.state
            .read()
            .map_err(|err| MessageStoreError::database(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> MessageStoreResult<RwLockWriteGuard<'_, InMemoryState>> {
        self.state
            .write()
            .map_err(|err| MessageStoreError::database(std::io::Error::other(err.to_string())))
    }
}

fn newest_first<'a>(messages: impl DoubleEndedIterator<Item = &'a Message>) -> Vec<Message> {
    messages.rev().cloned().collect()
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn save(&self, message: &NewMessage) -> MessageStoreResult<Message> {
        let mut state = self.write()?;
        state.last_id += 1;
        let stored = message.clone().into_stored(MessageId::new(state.last_id));
        state.messages.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: MessageId) -> MessageStoreResult<Option<Message>> {
        Ok(self.read()?.messages.get(&id).cloned())
    }

    async fn find_by_player(&self, player_id: PlayerId) -> MessageStoreResult<Vec<Message>> {
        let state = self.read()?;
        Ok(newest_first(
            state
                .messages
                .values()
                .filter(|message| message.player_id() == player_id),
        ))
    }

    async fn find_all(&self) -> MessageStoreResult<Vec<Message>> {
        Ok(newest_first(self.read()?.messages.values()))
    }

    async fn delete_by_id(&self, id: MessageId) -> MessageStoreResult<bool> {
        Ok(self.write()?.messages.remove(&id).is_some())
    }

    async fn count(&self) -> MessageStoreResult<u64> {
        let stored = self.read()?.messages.len();
        u64::try_from(stored).map_err(MessageStoreError::invalid_persisted_data)
    }
}
