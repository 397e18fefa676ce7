//! Player messages: domain model, persistence port, adapters, and the
//! submission façade.
//!
//! # Architecture
//!
//! - **Domain**: validated value types ([`domain::Message`], [`domain::PlayerId`], [`domain::MessageText`])
//! - **Ports**: the [`ports::MessageRepository`] persistence contract
//! - **Adapters**: [`adapters::postgres::PostgresMessageRepository`] and [`adapters::memory::InMemoryMessageRepository`]
//! - **Services**: [`services::MessageService`], the façade callers use
//!
//! # Example
//!
//! ```
//! use craftmessage::message::domain::NewMessage;
//!
//! let message = NewMessage::parse("0f8fad5b-d9cb-469f-a165-70867728950e", "  hello  ")
//!     .expect("valid submission");
//! assert_eq!(message.text().as_str(), "hello");
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
