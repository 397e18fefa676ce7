//! Error types for store connection management.

use std::sync::Arc;
use thiserror::Error;

/// Result type for store connection operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while building or tearing down a store session.
///
/// These never cross the façade boundary; the Store Handle converts them
/// into an `unavailable` state.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The configured driver or dialect does not name a supported store.
    #[error("unsupported store backend (driver '{driver}', dialect '{dialect}')")]
    UnsupportedBackend {
        /// Configured driver identifier.
        driver: String,
        /// Configured dialect identifier.
        dialect: String,
    },

    /// The connection pool could not be built or yield a connection.
    #[error("connection pool error: {0}")]
    Pool(Arc<dyn std::error::Error + Send + Sync>),

    /// Applying the configured schema mode failed.
    #[error("schema management failed: {0}")]
    Schema(Arc<dyn std::error::Error + Send + Sync>),

    /// A blocking background task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a pool construction or checkout failure.
    pub fn pool(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Pool(Arc::new(err))
    }

    /// Wraps a schema management failure.
    pub fn schema(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Schema(Arc::new(err))
    }

    /// Wraps a background task failure.
    pub fn task(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Task(Arc::new(err))
    }
}
