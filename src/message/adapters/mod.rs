//! Persistence adapters for the message module.
//!
//! - [`memory::InMemoryMessageRepository`]: thread-safe in-memory storage for
//!   tests and offline runs
//! - [`postgres::PostgresMessageRepository`]: `PostgreSQL` persistence using
//!   Diesel with an r2d2 connection pool
//!
//! Both implement [`MessageRepository`].
//!
//! [`MessageRepository`]: crate::message::ports::MessageRepository

pub mod memory;
pub mod postgres;
