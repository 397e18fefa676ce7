//! Store Handle: owns the session factory and its availability state.
//!
//! Lifecycle: `Uninitialized -> Probing -> {Available, Unavailable}`. Every
//! transition happens while holding one async lifecycle lock, so two callers
//! can never tear down and rebuild the pool concurrently. Repository
//! operations run outside the lock against a cloned repository handle and
//! rely on the pool for isolation.
//!
//! Each installed session gets a new generation. Repository handles are leased
//! together with their generation, so a connection loss reported by an
//! operation that started on an older session never tears down its
//! replacement.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

use super::connector::{StoreConnector, StoreSession};
use super::outcome::StoreOutcome;
use crate::config::StoreConfig;
use crate::message::ports::{MessageRepository, MessageStoreError};

/// Observable lifecycle state of a [`StoreHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// No initialisation attempted since creation or the last close.
    Uninitialized,
    /// A probe or session build is in progress.
    Probing,
    /// The session is built and its trial query succeeded.
    Available,
    /// The store could not be reached or initialised.
    Unavailable,
}

impl StoreState {
    /// Returns the state name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Probing => "probing",
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository borrowed from the session that was live when it was handed out.
#[derive(Clone)]
pub struct SessionLease {
    repository: Arc<dyn MessageRepository>,
    generation: u64,
}

impl SessionLease {
    /// Returns the leased repository.
    #[must_use]
    pub fn repository(&self) -> Arc<dyn MessageRepository> {
        Arc::clone(&self.repository)
    }

    /// Returns the generation of the session the lease came from.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for SessionLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLease")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct SessionSlot {
    open: Option<StoreSession>,
    generation: u64,
}

/// Owned handle over the message store's session factory.
pub struct StoreHandle {
    config: StoreConfig,
    connector: Arc<dyn StoreConnector>,
    session: Mutex<SessionSlot>,
    state: watch::Sender<StoreState>,
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl StoreHandle {
    /// Creates an uninitialised handle; nothing is contacted until first use.
    #[must_use]
    pub fn new(config: StoreConfig, connector: Arc<dyn StoreConnector>) -> Self {
        let (state, _) = watch::channel(StoreState::Uninitialized);
        Self {
            config,
            connector,
            session: Mutex::new(SessionSlot::default()),
            state,
        }
    }

    /// Returns the configuration the handle was built with.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the current state without waiting for the lifecycle lock.
    #[must_use]
    pub fn state(&self) -> StoreState {
        *self.state.borrow()
    }

    /// Subscribes to state changes, e.g. to render a degraded-mode notice.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// Initialises the session factory on first call; later calls are no-ops
    /// until [`StoreHandle::close`] resets the handle.
    ///
    /// Never fails: every problem is recorded as [`StoreState::Unavailable`].
    pub async fn ensure_initialized(&self) {
        let mut slot = self.session.lock().await;
        if self.state() != StoreState::Uninitialized {
            return;
        }
        self.set_state(StoreState::Probing);

        if !self.connector.probe(&self.config).await {
            debug!("store probe failed, skipping session initialisation");
            self.set_state(StoreState::Unavailable);
            return;
        }

        let built = match self.connector.connect(&self.config).await {
            Ok(built) => built,
            Err(err) => {
                debug!(error = %err, "failed to build store session");
                self.set_state(StoreState::Unavailable);
                return;
            }
        };

        match built.repository().count().await {
            Ok(total) => {
                slot.generation = slot.generation.wrapping_add(1);
                slot.open = Some(built);
                self.set_state(StoreState::Available);
                info!(
                    messages = total,
                    generation = slot.generation,
                    "message store initialised"
                );
            }
            Err(err) => {
                debug!(error = %err, "store trial query failed");
                release(built).await;
                self.set_state(StoreState::Unavailable);
            }
        }
    }

    /// Releases the session factory and resets the handle to
    /// [`StoreState::Uninitialized`]. Safe to call repeatedly.
    pub async fn close(&self) {
        let mut slot = self.session.lock().await;
        self.release_current(&mut slot).await;
    }

    /// Closes the handle only while the session of `generation` is still the
    /// live one.
    async fn close_generation(&self, generation: u64) {
        let mut slot = self.session.lock().await;
        if slot.open.is_none() || slot.generation != generation {
            debug!(
                generation,
                current = slot.generation,
                "ignoring failure from a retired store session"
            );
            return;
        }
        self.release_current(&mut slot).await;
    }

    async fn release_current(&self, slot: &mut SessionSlot) {
        if let Some(open) = slot.open.take() {
            info!(generation = slot.generation, "closing message store session");
            release(open).await;
        }
        self.set_state(StoreState::Uninitialized);
    }

    /// Closes the handle and initialises it again from scratch.
    pub async fn reprobe(&self) {
        self.close().await;
        self.ensure_initialized().await;
    }

    /// Leases the live repository when the handle is available.
    pub async fn repository(&self) -> Option<SessionLease> {
        let slot = self.session.lock().await;
        if self.state() != StoreState::Available {
            return None;
        }
        slot.open.as_ref().map(|open| SessionLease {
            repository: open.repository(),
            generation: slot.generation,
        })
    }

    /// Classifies a failed live operation.
    ///
    /// Connection loss closes the handle so the next caller re-probes instead
    /// of reusing a broken pool, unless the lease's session has already been
    /// replaced. Any other failure leaves the handle available.
    pub async fn report_failure<T>(
        &self,
        lease: &SessionLease,
        operation: &'static str,
        err: &MessageStoreError,
    ) -> StoreOutcome<T> {
        if err.is_connection_lost() {
            warn!(
                operation,
                generation = lease.generation(),
                error = %err,
                "message store connection lost"
            );
            self.close_generation(lease.generation()).await;
            StoreOutcome::TransientFailure
        } else {
            error!(operation, error = %err, "message store operation failed");
            StoreOutcome::Failed
        }
    }

    fn set_state(&self, next: StoreState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(from = %previous, to = %next, "store state changed");
        }
    }
}

async fn release(session: StoreSession) {
    let Some(teardown) = session.into_teardown() else {
        return;
    };
    match tokio::task::spawn_blocking(teardown).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => error!(error = %err, "store session teardown failed"),
        Err(err) => error!(error = %err, "store session teardown task failed"),
    }
}
