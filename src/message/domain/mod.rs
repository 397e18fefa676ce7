//! Domain model for player messages.
//!
//! A message pairs the submitting player's identity with a short, bounded
//! text. Identifiers are assigned by the store on the first successful
//! write and define the newest-first ordering of every listing.

mod error;
mod ids;
mod message;
mod text;

pub use error::MessageDomainError;
pub use ids::{MessageId, PlayerId};
pub use message::{Message, NewMessage};
pub use text::{MAX_TEXT_LENGTH, MessageText};
