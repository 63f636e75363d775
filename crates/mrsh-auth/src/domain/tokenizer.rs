//! # Field Tokenizer
//!
//! Splits a decoded credential payload into NUL-terminated fields.
//!
//! Every field must start before the end of the payload and must be
//! terminated by a NUL that also lies inside the payload. All scanning goes
//! through slice bounds, so a short or corrupted payload surfaces as
//! [`TruncatedBuffer`] instead of a read past its end.

use thiserror::Error;

/// The payload ended before the expected field and its terminator.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("payload truncated at offset {offset}")]
pub struct TruncatedBuffer {
    /// Offset at which the missing field was expected to start
    pub offset: usize,
}

/// Position of the next unread field within a [`Payload`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor(usize);

impl Cursor {
    /// Byte offset of the cursor from the start of the payload.
    pub fn offset(self) -> usize {
        self.0
    }
}

/// A borrowed, bounds-checked view over a decoded payload.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    bytes: &'a [u8],
}

impl<'a> Payload<'a> {
    /// Wrap a decoded payload.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Cursor positioned at the first field.
    pub fn start(&self) -> Cursor {
        Cursor(0)
    }

    /// Total payload length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read the field at `cursor`.
    ///
    /// Returns the field bytes (terminator excluded) and a cursor just past
    /// the terminator.
    ///
    /// # Errors
    /// * `TruncatedBuffer` - `cursor` is at or past the end of the payload,
    ///   or no NUL terminator follows it before the end
    pub fn next_field(&self, cursor: Cursor) -> Result<(&'a [u8], Cursor), TruncatedBuffer> {
        let rest = self
            .bytes
            .get(cursor.0..)
            .filter(|rest| !rest.is_empty())
            .ok_or(TruncatedBuffer { offset: cursor.0 })?;

        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(TruncatedBuffer { offset: cursor.0 })?;

        Ok((&rest[..len], Cursor(cursor.0 + len + 1)))
    }

    /// Sequential reader over the payload's fields.
    pub fn fields(&self) -> FieldReader<'a> {
        FieldReader {
            payload: *self,
            cursor: self.start(),
        }
    }
}

/// Stateful reader yielding fields in payload order.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    payload: Payload<'a>,
    cursor: Cursor,
}

impl<'a> FieldReader<'a> {
    /// Read the next field and advance past its terminator.
    ///
    /// A failed read leaves the reader where it was.
    pub fn next_field(&mut self) -> Result<&'a [u8], TruncatedBuffer> {
        let (field, cursor) = self.payload.next_field(self.cursor)?;
        self.cursor = cursor;
        Ok(field)
    }

    /// Current position in the payload.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }
}
