//! Repository port for message persistence.
//!
//! Each operation runs as its own unit of work: the adapter acquires a
//! connection, executes, and releases it on every exit path. Writes run
//! inside a transaction that is rolled back when any step fails.

use crate::message::domain::{Message, MessageId, NewMessage, PlayerId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for message repository operations.
pub type MessageStoreResult<T> = Result<T, MessageStoreError>;

/// Message persistence contract.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persists a new message and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MessageStoreError`] when the write or commit fails; the
    /// transaction is rolled back in that case.
    async fn save(&self, message: &NewMessage) -> MessageStoreResult<Message>;

    /// Finds a message by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MessageStoreError`] when the query fails.
    async fn find_by_id(&self, id: MessageId) -> MessageStoreResult<Option<Message>>;

    /// Lists a player's messages, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MessageStoreError`] when the query fails.
    async fn find_by_player(&self, player_id: PlayerId) -> MessageStoreResult<Vec<Message>>;

    /// Lists every message, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MessageStoreError`] when the query fails.
    async fn find_all(&self) -> MessageStoreResult<Vec<Message>>;

    /// Deletes a message, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`MessageStoreError`] when the delete or commit fails.
    async fn delete_by_id(&self, id: MessageId) -> MessageStoreResult<bool>;

    /// Counts stored messages.
    ///
    /// # Errors
    ///
    /// Returns [`MessageStoreError`] when the query fails.
    async fn count(&self) -> MessageStoreResult<u64>;

    /// Returns whether a message with the identifier exists.
    ///
    /// # Errors
    ///
    /// Returns [`MessageStoreError`] when the lookup fails.
    async fn exists_by_id(&self, id: MessageId) -> MessageStoreResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

/// Errors returned by message repository implementations.
#[derive(Debug, Clone, Error)]
pub enum MessageStoreError {
    /// The message does not exist.
    #[error("message not found: {0}")]
    NotFound(MessageId),

    /// The connection to the store was lost or could not be acquired.
    #[error("store connection lost: {0}")]
    ConnectionLost(Arc<dyn std::error::Error + Send + Sync>),

    /// Every pooled connection was busy for the whole checkout timeout.
    #[error("store connection pool exhausted: {0}")]
    PoolExhausted(Arc<dyn std::error::Error + Send + Sync>),

    /// A statement failed while the connection stayed usable.
    #[error("database error: {0}")]
    Database(Arc<dyn std::error::Error + Send + Sync>),

    /// A stored row could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),
}

impl MessageStoreError {
    /// Wraps a failure that left the connection unusable.
    pub fn connection_lost(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::ConnectionLost(Arc::new(err))
    }

    /// Wraps a checkout timeout on a saturated pool.
    pub fn pool_exhausted(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::PoolExhausted(Arc::new(err))
    }

    /// Wraps an operation-local database failure.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Database(Arc::new(err))
    }

    /// Wraps a data-quality error from a persisted row.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Returns `true` when the failure means the store connection is gone
    /// and the pool should be rebuilt before the next attempt.
    #[must_use]
    pub const fn is_connection_lost(&self) -> bool {
        matches!(self, Self::ConnectionLost(_))
    }
}
