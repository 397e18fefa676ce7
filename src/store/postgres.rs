//! `PostgreSQL` connector: pool construction and schema management.

use super::connector::{StoreConnector, StoreSession};
use super::error::{StoreError, StoreResult};
use super::probe::probe_postgres;
use crate::config::{SchemaMode, StoreConfig};
use crate::message::adapters::postgres::{MessagePgPool, PostgresMessageRepository};
use async_trait::async_trait;
use diesel::connection::{InstrumentationEvent, SimpleConnection};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-19-000000_create_messages/up.sql");
const DROP_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-19-000000_create_messages/down.sql");
const VALIDATE_SCHEMA_SQL: &str = "SELECT id, player_id, text FROM messages LIMIT 0";

const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Connector that builds r2d2-pooled Diesel sessions against `PostgreSQL`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgStoreConnector;

impl PgStoreConnector {
    /// Creates the connector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StoreConnector for PgStoreConnector {
    async fn probe(&self, config: &StoreConfig) -> bool {
        probe_postgres(config).await
    }

    async fn connect(&self, config: &StoreConfig) -> StoreResult<StoreSession> {
        if !config.targets_postgres() {
            return Err(StoreError::UnsupportedBackend {
                driver: config.driver.clone(),
                dialect: config.dialect.clone(),
            });
        }

        let owned = config.clone();
        let pool = tokio::task::spawn_blocking(move || {
            let pool = build_pool(&owned)?;
            apply_schema_mode(&pool, owned.schema_mode)?;
            Ok::<_, StoreError>(pool)
        })
        .await
        .map_err(StoreError::task)??;

        info!(
            max_size = config.pool_max_size,
            min_idle = config.pool_min_idle,
            schema_mode = %config.schema_mode,
            "message store pool ready"
        );

        let repository = Arc::new(PostgresMessageRepository::new(pool.clone()));
        let session = StoreSession::new(repository);
        if config.schema_mode == SchemaMode::CreateDrop {
            return Ok(session.with_teardown(move || drop_schema(&pool)));
        }
        Ok(session)
    }
}

fn build_pool(config: &StoreConfig) -> StoreResult<MessagePgPool> {
    let manager = ConnectionManager::<PgConnection>::new(config.connection_url());
    let mut builder = Pool::builder()
        .max_size(config.pool_max_size)
        .min_idle(Some(config.pool_min_idle))
        .connection_timeout(POOL_CONNECTION_TIMEOUT);
    if config.show_sql {
        builder = builder.connection_customizer(Box::new(StatementLogger));
    }
    builder.build(manager).map_err(StoreError::pool)
}

fn apply_schema_mode(pool: &MessagePgPool, mode: SchemaMode) -> StoreResult<()> {
    let mut pooled = pool.get().map_err(StoreError::pool)?;
    let connection: &mut PgConnection = &mut pooled;
    debug!(%mode, "applying schema mode");
    match mode {
        SchemaMode::None => Ok(()),
        SchemaMode::Validate => diesel::sql_query(VALIDATE_SCHEMA_SQL)
            .execute(connection)
            .map(|_| ())
            .map_err(StoreError::schema),
        SchemaMode::Update => connection
            .batch_execute(CREATE_SCHEMA_SQL)
            .map_err(StoreError::schema),
        SchemaMode::Create | SchemaMode::CreateDrop => connection
            .batch_execute(DROP_SCHEMA_SQL)
            .and_then(|()| connection.batch_execute(CREATE_SCHEMA_SQL))
            .map_err(StoreError::schema),
    }
}

fn drop_schema(pool: &MessagePgPool) -> StoreResult<()> {
    let mut pooled = pool.get().map_err(StoreError::pool)?;
    let connection: &mut PgConnection = &mut pooled;
    connection
        .batch_execute(DROP_SCHEMA_SQL)
        .map_err(StoreError::schema)?;
    info!("message schema dropped");
    Ok(())
}

/// Logs every statement run on a pooled connection.
#[derive(Debug, Clone, Copy)]
struct StatementLogger;

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for StatementLogger {
    fn on_acquire(&self, connection: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        connection.set_instrumentation(log_statement);
        Ok(())
    }
}

fn log_statement(event: InstrumentationEvent<'_>) {
    if let InstrumentationEvent::StartQuery { query, .. } = event {
        tracing::info!(target: "craftmessage::sql", %query, "executing statement");
    }
}
