//! Diesel row models for message persistence.

use super::schema::messages;
use diesel::prelude::*;

/// Query result row for message records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageRow {
    /// Store-assigned surrogate key.
    pub id: i64,
    /// Submitting player's UUID.
    pub player_id: uuid::Uuid,
    /// Message text.
    pub text: String,
}

/// Insert model for message records; the identifier comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessageRow {
    /// Submitting player's UUID.
    pub player_id: uuid::Uuid,
    /// Message text.
    pub text: String,
}
