//! Submission façade over the Store Handle and message repository.
//!
//! Every operation follows the same shape: make sure the handle is
//! initialised, re-probe once when it is not available, run the repository
//! call, and classify any failure through the handle. Nothing here returns an
//! error to the caller; the outcome-returning methods report a
//! [`StoreOutcome`] tag and the plain methods degrade to `false`, empty, or
//! zero.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::message::{
    domain::{Message, MessageId, NewMessage, PlayerId},
    ports::{MessageRepository, MessageStoreResult},
};
use crate::store::{SessionLease, StoreHandle, StoreOutcome, StoreState};

/// Single entry point for submitting and querying player messages.
#[derive(Debug, Clone)]
pub struct MessageService {
    handle: Arc<StoreHandle>,
}

impl MessageService {
    /// Creates a façade over a shared Store Handle.
    #[must_use]
    pub const fn new(handle: Arc<StoreHandle>) -> Self {
        Self { handle }
    }

    /// Returns the underlying Store Handle.
    #[must_use]
    pub const fn handle(&self) -> &Arc<StoreHandle> {
        &self.handle
    }

    /// Returns the handle's current state without initialising it.
    #[must_use]
    pub fn state(&self) -> StoreState {
        self.handle.state()
    }

    /// Initialises the handle if needed and reports whether it is available.
    pub async fn is_available(&self) -> bool {
        self.handle.ensure_initialized().await;
        self.handle.state() == StoreState::Available
    }

    /// Persists a validated message.
    pub async fn save(&self, message: NewMessage) -> StoreOutcome<Message> {
        let outcome = self
            .run("save", |repository| async move {
                repository.save(&message).await
            })
            .await;
        if let StoreOutcome::Ok(stored) = &outcome {
            info!(id = %stored.id(), player = %stored.player_id(), "message saved");
        }
        outcome
    }

    /// Looks up one message by identifier.
    pub async fn fetch(&self, id: MessageId) -> StoreOutcome<Option<Message>> {
        self.run("find_by_id", |repository| async move {
            repository.find_by_id(id).await
        })
        .await
    }

    /// Lists a player's messages, newest first.
    pub async fn fetch_for_player(&self, player_id: PlayerId) -> StoreOutcome<Vec<Message>> {
        self.run("find_by_player", |repository| async move {
            repository.find_by_player(player_id).await
        })
        .await
    }

    /// Lists every message, newest first.
    pub async fn fetch_all(&self) -> StoreOutcome<Vec<Message>> {
        self.run("find_all", |repository| async move {
            repository.find_all().await
        })
        .await
    }

    /// Counts stored messages.
    pub async fn fetch_count(&self) -> StoreOutcome<u64> {
        self.run("count", |repository| async move { repository.count().await })
            .await
    }

    /// Deletes a message, reporting whether it existed.
    pub async fn remove(&self, id: MessageId) -> StoreOutcome<bool> {
        self.run("delete_by_id", |repository| async move {
            repository.delete_by_id(id).await
        })
        .await
    }

    /// Validates and persists a raw submission.
    ///
    /// Returns `true` only when the message was stored. Invalid input is
    /// logged and rejected without touching the store.
    pub async fn submit_message(&self, player_id: &str, text: &str) -> bool {
        match NewMessage::parse(player_id, text) {
            Ok(message) => self.save(message).await.is_ok(),
            Err(err) => {
                warn!(player = player_id, error = %err, "rejected message submission");
                false
            }
        }
    }

    /// Returns a player's messages, or an empty list when the store fails.
    pub async fn list_for_player(&self, player_id: PlayerId) -> Vec<Message> {
        self.fetch_for_player(player_id).await.unwrap_or_default()
    }

    /// Returns every message, or an empty list when the store fails.
    pub async fn list_all(&self) -> Vec<Message> {
        self.fetch_all().await.unwrap_or_default()
    }

    /// Returns the number of stored messages, or zero when the store fails.
    pub async fn count(&self) -> u64 {
        self.fetch_count().await.unwrap_or_default()
    }

    /// Returns the message, or `None` when it is absent or the store fails.
    pub async fn find_message(&self, id: MessageId) -> Option<Message> {
        self.fetch(id).await.into_option().flatten()
    }

    /// Returns whether the message exists; `false` when the store fails.
    pub async fn message_exists(&self, id: MessageId) -> bool {
        self.run("exists_by_id", |repository| async move {
            repository.exists_by_id(id).await
        })
        .await
        .unwrap_or_default()
    }

    /// Deletes a message; `false` when it was absent or the store fails.
    pub async fn delete_message(&self, id: MessageId) -> bool {
        self.remove(id).await.unwrap_or_default()
    }

    /// Releases the store session. The next operation re-probes.
    pub async fn close(&self) {
        self.handle.close().await;
    }

    async fn acquire(&self, operation: &'static str) -> Option<SessionLease> {
        self.handle.ensure_initialized().await;
        if let Some(lease) = self.handle.repository().await {
            return Some(lease);
        }

        self.handle.reprobe().await;
        let lease = self.handle.repository().await;
        if lease.is_none() {
            warn!(operation, "message store unavailable after re-probe");
        }
        lease
    }

    async fn run<T, F, Fut>(&self, operation: &'static str, call: F) -> StoreOutcome<T>
    where
        F: FnOnce(Arc<dyn MessageRepository>) -> Fut,
        Fut: Future<Output = MessageStoreResult<T>>,
    {
        let Some(lease) = self.acquire(operation).await else {
            return StoreOutcome::Unavailable;
        };
        match call(lease.repository()).await {
            Ok(value) => StoreOutcome::Ok(value),
            Err(err) => self.handle.report_failure(&lease, operation, &err).await,
        }
    }
}
