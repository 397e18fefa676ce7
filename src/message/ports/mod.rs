//! Port contracts for message persistence.

mod repository;

pub use repository::{MessageRepository, MessageStoreError, MessageStoreResult};
