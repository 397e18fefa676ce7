//! Availability Prober.
//!
//! Opening one raw connection fails much faster than building a pool when the
//! server is down, so the handle probes before committing to initialisation.

use crate::config::StoreConfig;
use diesel::Connection;
use diesel::pg::PgConnection;
use tracing::debug;

/// Opens and immediately closes a raw `PostgreSQL` connection.
///
/// Returns `false` on any failure, including a driver that does not name
/// `PostgreSQL`; never panics.
pub async fn probe_postgres(config: &StoreConfig) -> bool {
    if !config.targets_postgres() {
        debug!(driver = %config.driver, "probe skipped for non-PostgreSQL driver");
        return false;
    }

    let url = config.connection_url();
    match tokio::task::spawn_blocking(move || PgConnection::establish(&url)).await {
        Ok(Ok(connection)) => {
            drop(connection);
            true
        }
        Ok(Err(err)) => {
            debug!(error = %err, "store probe failed");
            false
        }
        Err(err) => {
            debug!(error = %err, "store probe task failed");
            false
        }
    }
}
