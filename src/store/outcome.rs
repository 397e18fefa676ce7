//! Tagged outcome of a façade operation.

/// Result of one store operation as seen by the façade's callers.
///
/// Failures are values, never panics or errors: callers that only need the
/// degraded form use [`StoreOutcome::into_option`] or
/// [`StoreOutcome::unwrap_or_default`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum StoreOutcome<T> {
    /// The operation completed.
    Ok(T),
    /// The store was unreachable, even after one re-probe.
    Unavailable,
    /// The connection was lost mid-operation; the handle has been closed so
    /// the next attempt re-probes from scratch.
    TransientFailure,
    /// The operation failed while the store stayed available.
    Failed,
}

impl<T> StoreOutcome<T> {
    /// Returns `true` for [`StoreOutcome::Ok`].
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns the completed value, if any.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Unavailable | Self::TransientFailure | Self::Failed => None,
        }
    }

    /// Returns the completed value or `T::default()`.
    #[must_use]
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.into_option().unwrap_or_default()
    }

    /// Maps the completed value, keeping failure tags.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StoreOutcome<U> {
        match self {
            Self::Ok(value) => StoreOutcome::Ok(f(value)),
            Self::Unavailable => StoreOutcome::Unavailable,
            Self::TransientFailure => StoreOutcome::TransientFailure,
            Self::Failed => StoreOutcome::Failed,
        }
    }
}
