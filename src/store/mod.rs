//! Store connection lifecycle and availability tracking.
//!
//! - [`StoreConnector`] opens sessions; [`PgStoreConnector`] is the
//!   `PostgreSQL` implementation and [`probe_postgres`] its cheap
//!   reachability check
//! - [`StoreHandle`] owns the session and the availability state machine
//! - [`StoreOutcome`] tags what happened to a single façade operation

mod connector;
mod error;
mod handle;
mod outcome;
mod postgres;
mod probe;

pub use connector::{StoreConnector, StoreSession, Teardown};
pub use error::{StoreError, StoreResult};
pub use handle::{SessionLease, StoreHandle, StoreState};
pub use outcome::StoreOutcome;
pub use postgres::PgStoreConnector;
pub use probe::probe_postgres;

#[cfg(test)]
pub(crate) use connector::MockStoreConnector;
