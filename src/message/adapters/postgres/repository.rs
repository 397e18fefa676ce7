//! `PostgreSQL` repository implementation for player messages.

use super::{
    models::{MessageRow, NewMessageRow},
    schema::messages,
};
use crate::message::{
    domain::{Message, MessageId, MessageText, NewMessage, PlayerId},
    ports::{MessageRepository, MessageStoreError, MessageStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// `PostgreSQL` connection pool type used by the message repository.
pub type MessagePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed message repository.
///
/// Every operation checks a connection out of the pool on a blocking worker
/// thread and returns it to the pool when the closure finishes, whatever the
/// outcome.
#[derive(Debug, Clone)]
pub struct PostgresMessageRepository {
    pool: MessagePgPool,
}

impl PostgresMessageRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: MessagePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> MessageStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> MessageStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(|err| checkout_failure(&pool, err))?;
            f(&mut connection)
        })
        .await
        .map_err(MessageStoreError::database)?
    }
}

/// Classifies a failed pool checkout.
///
/// r2d2 only reports a timeout. When every connection the pool may hold is
/// open and handed out, the server is evidently up and the pool is merely
/// saturated; otherwise no connection could be opened at all.
fn checkout_failure(pool: &MessagePgPool, err: PoolError) -> MessageStoreError {
    let state = pool.state();
    if state.idle_connections == 0 && state.connections >= pool.max_size() {
        MessageStoreError::pool_exhausted(err)
    } else {
        MessageStoreError::connection_lost(err)
    }
}

impl From<DieselError> for MessageStoreError {
    fn from(err: DieselError) -> Self {
        if is_connection_failure(&err) {
            Self::connection_lost(err)
        } else {
            Self::database(err)
        }
    }
}

const fn is_connection_failure(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            _
        ) | DieselError::BrokenTransactionManager
    )
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn save(&self, message: &NewMessage) -> MessageStoreResult<Message> {
        let new_row = NewMessageRow {
            player_id: message.player_id().into_inner(),
            text: message.text().as_str().to_owned(),
        };

        let stored = self
            .run_blocking(move |connection| {
                let row = connection.transaction::<_, MessageStoreError, _>(|tx| {
                    Ok(diesel::insert_into(messages::table)
                        .values(&new_row)
                        .returning(MessageRow::as_returning())
                        .get_result::<MessageRow>(tx)?)
                })?;
                row_to_message(row)
            })
            .await?;
        debug!(id = %stored.id(), player = %stored.player_id(), "message row inserted");
        Ok(stored)
    }

    async fn find_by_id(&self, id: MessageId) -> MessageStoreResult<Option<Message>> {
        self.run_blocking(move |connection| {
            let row = messages::table
                .find(id.into_inner())
                .select(MessageRow::as_select())
                .first::<MessageRow>(connection)
                .optional()?;
            row.map(row_to_message).transpose()
        })
        .await
    }

    async fn find_by_player(&self, player_id: PlayerId) -> MessageStoreResult<Vec<Message>> {
        self.run_blocking(move |connection| {
            let rows = messages::table
                .filter(messages::player_id.eq(player_id.into_inner()))
                .order(messages::id.desc())
                .select(MessageRow::as_select())
                .load::<MessageRow>(connection)?;
            rows.into_iter().map(row_to_message).collect()
        })
        .await
    }

    async fn find_all(&self) -> MessageStoreResult<Vec<Message>> {
        self.run_blocking(move |connection| {
            let rows = messages::table
                .order(messages::id.desc())
                .select(MessageRow::as_select())
                .load::<MessageRow>(connection)?;
            rows.into_iter().map(row_to_message).collect()
        })
        .await
    }

    async fn delete_by_id(&self, id: MessageId) -> MessageStoreResult<bool> {
        let raw_id = id.into_inner();
        self.run_blocking(move |connection| {
            // A missing row aborts the transaction so it is rolled back.
            let outcome = connection.transaction::<_, MessageStoreError, _>(|tx| {
                let existing = messages::table
                    .find(raw_id)
                    .select(messages::id)
                    .for_update()
                    .first::<i64>(tx)
                    .optional()?;
                if existing.is_none() {
                    return Err(MessageStoreError::NotFound(id));
                }
                diesel::delete(messages::table.find(raw_id)).execute(tx)?;
                Ok(())
            });
            match outcome {
                Ok(()) => Ok(true),
                Err(MessageStoreError::NotFound(_)) => Ok(false),
                Err(err) => Err(err),
            }
        })
        .await
    }

    async fn count(&self) -> MessageStoreResult<u64> {
        self.run_blocking(move |connection| {
            let total = messages::table.count().get_result::<i64>(connection)?;
            u64::try_from(total).map_err(MessageStoreError::invalid_persisted_data)
        })
        .await
    }
}

fn row_to_message(row: MessageRow) -> MessageStoreResult<Message> {
    let MessageRow {
        id,
        player_id,
        text,
    } = row;
    let parsed_text = MessageText::new(text).map_err(MessageStoreError::invalid_persisted_data)?;
    Ok(NewMessage::new(PlayerId::from_uuid(player_id), parsed_text).into_stored(MessageId::new(id)))
}
