//! Receives decoded submission payloads and queues them for storage.

use tracing::{debug, warn};

use super::payload::{PayloadError, SubmitMessagePayload};
use crate::message::domain::{MessageDomainError, MessageText, NewMessage, PlayerId};
use crate::store::{StoreHandle, StoreState};
use crate::worker::Submitter;
use std::sync::Arc;

/// What happened to one received payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The message was queued on the submission worker.
    Queued,
    /// The worker queue was full or closed; the message was dropped.
    QueueFull,
    /// The payload body could not be decoded.
    Malformed(PayloadError),
    /// The decoded text failed message validation.
    Rejected(MessageDomainError),
}

/// Handles inbound submission payloads on the network thread.
///
/// Never blocks: the store state is read without waiting and the message is
/// handed to the worker with a non-blocking send.
#[derive(Debug, Clone)]
pub struct PayloadHandler {
    handle: Arc<StoreHandle>,
    submitter: Submitter,
}

impl PayloadHandler {
    /// Creates a handler that reports store state from `handle` and queues
    /// work on `submitter`.
    #[must_use]
    pub const fn new(handle: Arc<StoreHandle>, submitter: Submitter) -> Self {
        Self { handle, submitter }
    }

    /// Decodes a payload body sent by `player_id` and queues it.
    #[must_use]
    pub fn handle(&self, player_id: PlayerId, bytes: &[u8]) -> HandleOutcome {
        let payload = match SubmitMessagePayload::decode(bytes) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(player = %player_id, error = %err, "malformed message payload");
                return HandleOutcome::Malformed(err);
            }
        };
        debug!(player = %player_id, length = payload.text().len(), "message payload received");

        if self.handle.state() == StoreState::Unavailable {
            warn!(player = %player_id, "message store not available, queueing anyway");
        }

        let text = match MessageText::new(payload.into_text()) {
            Ok(text) => text,
            Err(err) => {
                warn!(player = %player_id, error = %err, "rejected message payload");
                return HandleOutcome::Rejected(err);
            }
        };

        if self.submitter.submit(NewMessage::new(player_id, text)) {
            HandleOutcome::Queued
        } else {
            HandleOutcome::QueueFull
        }
    }
}
