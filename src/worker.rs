//! Single background worker that serialises message submissions.
//!
//! Interactive callers hand submissions to a [`Submitter`] and return
//! immediately; one long-lived task drains the bounded queue in order and is
//! the only writer against the store.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::message::domain::NewMessage;
use crate::message::services::MessageService;

/// Default queue capacity used by [`SubmissionWorker::spawn_default`].
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

struct Submission {
    message: NewMessage,
    reply: Option<oneshot::Sender<bool>>,
}

/// Cloneable sending side of the submission queue.
#[derive(Debug, Clone)]
pub struct Submitter {
    queue: mpsc::Sender<Submission>,
}

impl Submitter {
    /// Queues a submission without waiting.
    ///
    /// Returns `false` when the queue is full or the worker has stopped.
    #[must_use]
    pub fn submit(&self, message: NewMessage) -> bool {
        match self.queue.try_send(Submission {
            message,
            reply: None,
        }) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("submission queue full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("submission worker stopped, dropping message");
                false
            }
        }
    }

    /// Queues a submission and waits for the store's verdict.
    ///
    /// Waits for queue space rather than dropping the message. Returns
    /// `false` when the worker has stopped or the save failed.
    pub async fn submit_and_wait(&self, message: NewMessage) -> bool {
        let (reply, verdict) = oneshot::channel();
        let queued = self
            .queue
            .send(Submission {
                message,
                reply: Some(reply),
            })
            .await;
        if queued.is_err() {
            warn!("submission worker stopped, dropping message");
            return false;
        }
        verdict.await.unwrap_or(false)
    }
}

/// Owner of the background submission task.
#[derive(Debug)]
pub struct SubmissionWorker {
    submitter: Submitter,
    service: MessageService,
    task: JoinHandle<()>,
}

impl SubmissionWorker {
    /// Starts the worker on the current Tokio runtime.
    ///
    /// A `capacity` of zero is raised to one.
    #[must_use]
    pub fn spawn(service: MessageService, capacity: usize) -> Self {
        let (queue, receiver) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(drain(service.clone(), receiver));
        Self {
            submitter: Submitter { queue },
            service,
            task,
        }
    }

    /// Starts the worker with [`DEFAULT_QUEUE_CAPACITY`].
    #[must_use]
    pub fn spawn_default(service: MessageService) -> Self {
        Self::spawn(service, DEFAULT_QUEUE_CAPACITY)
    }

    /// Returns a handle for queueing submissions.
    #[must_use]
    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    /// Stops accepting new work from this owner, drains the queue, and
    /// closes the store session.
    ///
    /// Outstanding [`Submitter`] clones keep the queue open; drop them first
    /// for shutdown to complete.
    pub async fn shutdown(self) {
        let Self {
            submitter,
            service,
            task,
        } = self;
        drop(submitter);
        if let Err(err) = task.await {
            error!(error = %err, "submission worker task failed");
        }
        service.close().await;
        debug!("submission worker stopped");
    }
}

async fn drain(service: MessageService, mut receiver: mpsc::Receiver<Submission>) {
    while let Some(Submission { message, reply }) = receiver.recv().await {
        let player = message.player_id();
        let saved = service.save(message).await.is_ok();
        if !saved {
            warn!(%player, "queued message was not stored");
        }
        if let Some(reply) = reply
            && reply.send(saved).is_err()
        {
            debug!("submission waiter went away before the verdict");
        }
    }
}
