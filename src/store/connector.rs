//! Port for opening store sessions.
//!
//! A connector knows how to check reachability cheaply and how to build the
//! heavier session factory (connection pool plus repository). The Store
//! Handle drives it; tests substitute fakes.

use crate::config::StoreConfig;
use crate::message::ports::MessageRepository;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use super::error::StoreResult;

/// Blocking cleanup run when a session is closed.
pub type Teardown = Box<dyn FnOnce() -> StoreResult<()> + Send>;

/// A built session factory: the repository bound to a live pool, plus any
/// cleanup owed when the session is released.
pub struct StoreSession {
    repository: Arc<dyn MessageRepository>,
    teardown: Option<Teardown>,
}

impl StoreSession {
    /// Wraps a repository that needs no cleanup beyond being dropped.
    #[must_use]
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self {
            repository,
            teardown: None,
        }
    }

    /// Registers blocking cleanup to run when the session is closed.
    #[must_use]
    pub fn with_teardown(
        mut self,
        teardown: impl FnOnce() -> StoreResult<()> + Send + 'static,
    ) -> Self {
        self.teardown = Some(Box::new(teardown));
        self
    }

    /// Returns the repository bound to this session.
    #[must_use]
    pub fn repository(&self) -> Arc<dyn MessageRepository> {
        Arc::clone(&self.repository)
    }

    pub(crate) fn into_teardown(self) -> Option<Teardown> {
        self.teardown
    }
}

impl fmt::Debug for StoreSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSession")
            .field("has_teardown", &self.teardown.is_some())
            .finish_non_exhaustive()
    }
}

/// Opens sessions against a backing store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Attempts a single raw connection and closes it immediately.
    ///
    /// Any failure (authentication, network, timeout) yields `false`.
    async fn probe(&self, config: &StoreConfig) -> bool;

    /// Builds a session factory from the full configuration.
    ///
    /// # Errors
    ///
    /// Returns [`super::StoreError`] when the backend is unsupported, the pool
    /// cannot be built, or schema management fails.
    async fn connect(&self, config: &StoreConfig) -> StoreResult<StoreSession>;
}
