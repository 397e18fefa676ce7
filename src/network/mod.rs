//! Server-side network surface: the submission payload and its handler.

mod handler;
mod payload;

pub use handler::{HandleOutcome, PayloadHandler};
pub use payload::{CHANNEL, MAX_STRING_UNITS, PayloadError, SubmitMessagePayload};
