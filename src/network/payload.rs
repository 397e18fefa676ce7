//! Wire form of the message submission payload.
//!
//! The payload carries a single string: a VarInt byte length followed by that
//! many UTF-8 bytes. The game session supplies the framing and the sender's
//! identity; this module only handles the body.

use std::str::Utf8Error;
use thiserror::Error;

/// Channel identifier the payload is registered under.
pub const CHANNEL: &str = "craftmessage:simple_message";

/// Maximum string length in UTF-16 code units.
pub const MAX_STRING_UNITS: usize = 32_767;

/// Largest number of bytes a UTF-8 string of [`MAX_STRING_UNITS`] units can
/// occupy.
const MAX_STRING_BYTES: usize = MAX_STRING_UNITS * 3;

const MAX_VARINT_BYTES: usize = 5;
const SEGMENT_BITS: u8 = 0x7F;
const CONTINUE_BIT: u8 = 0x80;

/// Errors raised while encoding or decoding a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// The buffer ended before the length prefix or string was complete.
    #[error("payload truncated: needed {needed} bytes, {available} available")]
    Truncated {
        /// Bytes required to finish the current field.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// The length prefix did not terminate within five bytes.
    #[error("length prefix is longer than 5 bytes")]
    VarIntTooLong,

    /// The string exceeds the protocol limit.
    #[error("string of {length} units exceeds limit of {limit}")]
    TooLong {
        /// Measured length (bytes for the prefix check, UTF-16 units otherwise).
        length: usize,
        /// Applicable limit.
        limit: usize,
    },

    /// The string bytes are not valid UTF-8.
    #[error("payload string is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),

    /// Bytes remained after the string.
    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),
}

/// Client-to-server request to store one message for the sending player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitMessagePayload {
    text: String,
}

impl SubmitMessagePayload {
    /// Wraps raw message text. Message validation happens server-side.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the carried text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the payload and returns the text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// Encodes the payload body.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::TooLong`] when the text exceeds
    /// [`MAX_STRING_UNITS`] UTF-16 units.
    pub fn encode(&self) -> Result<Vec<u8>, PayloadError> {
        let units = self.text.encode_utf16().count();
        if units > MAX_STRING_UNITS {
            return Err(PayloadError::TooLong {
                length: units,
                limit: MAX_STRING_UNITS,
            });
        }
        let bytes = self.text.as_bytes();
        let length = u32::try_from(bytes.len()).map_err(|_| PayloadError::TooLong {
            length: bytes.len(),
            limit: MAX_STRING_BYTES,
        })?;

        let mut out = Vec::with_capacity(bytes.len() + MAX_VARINT_BYTES);
        write_varint(length, &mut out);
        out.extend_from_slice(bytes);
        Ok(out)
    }

    /// Decodes a payload body, rejecting anything after the string.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] when the prefix is truncated or too long, the
    /// string is over the limit or not UTF-8, or trailing bytes remain.
    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        let (declared, prefix_len) = read_varint(bytes)?;
        let length = usize::try_from(declared).unwrap_or(usize::MAX);
        if length > MAX_STRING_BYTES {
            return Err(PayloadError::TooLong {
                length,
                limit: MAX_STRING_BYTES,
            });
        }

        let rest = bytes.get(prefix_len..).unwrap_or_default();
        let body = rest.get(..length).ok_or(PayloadError::Truncated {
            needed: length,
            available: rest.len(),
        })?;
        let trailing = rest.len() - body.len();
        if trailing > 0 {
            return Err(PayloadError::TrailingBytes(trailing));
        }

        let text = std::str::from_utf8(body)?;
        let units = text.encode_utf16().count();
        if units > MAX_STRING_UNITS {
            return Err(PayloadError::TooLong {
                length: units,
                limit: MAX_STRING_UNITS,
            });
        }
        Ok(Self::new(text))
    }
}

fn read_varint(bytes: &[u8]) -> Result<(u32, usize), PayloadError> {
    let mut value: u32 = 0;
    for (position, byte) in bytes.iter().copied().take(MAX_VARINT_BYTES).enumerate() {
        value |= u32::from(byte & SEGMENT_BITS) << (7 * position);
        if byte & CONTINUE_BIT == 0 {
            return Ok((value, position + 1));
        }
    }
    if bytes.len() >= MAX_VARINT_BYTES {
        Err(PayloadError::VarIntTooLong)
    } else {
        Err(PayloadError::Truncated {
            needed: bytes.len() + 1,
            available: bytes.len(),
        })
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "value is masked to seven bits before the cast"
)]
fn write_varint(mut value: u32, out: &mut Vec<u8>) {
    loop {
        let segment = (value & u32::from(SEGMENT_BITS)) as u8;
        value >>= 7;
        if value == 0 {
            out.push(segment);
            return;
        }
        out.push(segment | CONTINUE_BIT);
    }
}
