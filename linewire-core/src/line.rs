//! Line accumulation for the receive path
//!
//! Bytes arrive one at a time from the UART receive interrupt. A line is
//! any non-empty run of bytes ended by `\n` or `\r`:
//!
//! - consecutive terminators never produce empty lines (`\r\n` is one end)
//! - a line keeps at most `C - 1` bytes, the last slot of the storage is
//!   reserved for the terminator
//! - bytes past that limit are dropped and the truncated line is still
//!   committed when its terminator arrives

use heapless::Vec;

/// Line feed terminator
pub const LINE_FEED: u8 = b'\n';

/// Carriage return terminator
pub const CARRIAGE_RETURN: u8 = b'\r';

/// Check whether a byte ends a line
#[inline]
pub fn is_terminator(byte: u8) -> bool {
    matches!(byte, LINE_FEED | CARRIAGE_RETURN)
}

/// A committed line
///
/// Owns its bytes, so the accumulator that produced it can be reused
/// immediately. Holds at most `C - 1` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Line<const C: usize> {
    bytes: Vec<u8, C>,
}

impl<const C: usize> Line<C> {
    /// Copy `bytes` into a new line, cutting anything past `C - 1` bytes
    pub fn from_slice(bytes: &[u8]) -> Self {
        let len = bytes.len().min(C.saturating_sub(1));
        let mut owned = Vec::new();
        // Cannot fail: len < C
        let _ = owned.extend_from_slice(&bytes[..len]);
        Self { bytes: owned }
    }

    /// Raw line content, without terminator
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Line content as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }

    /// Number of bytes in the line
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the line has no content
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Result of feeding one byte to a [`LineAccumulator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Accumulate<'a> {
    /// Byte appended to the current line
    Stored,
    /// Line buffer full, byte dropped
    Truncated,
    /// Terminator with nothing pending
    Ignored,
    /// Terminator ended a non-empty line
    ///
    /// The slice borrows the accumulator's storage and is only valid until
    /// the next byte is pushed.
    Complete(&'a [u8]),
}

/// Builds lines from a byte-at-a-time receive path
///
/// Owned by the receive interrupt; nothing else touches it.
#[derive(Debug, Clone)]
pub struct LineAccumulator<const C: usize> {
    storage: [u8; C],
    /// One past the last accepted byte
    position: usize,
}

impl<const C: usize> Default for LineAccumulator<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const C: usize> LineAccumulator<C> {
    const VALID_CAPACITY: () = assert!(C >= 2, "line storage needs room for a byte and a terminator");

    /// Create an empty accumulator
    pub const fn new() -> Self {
        let () = Self::VALID_CAPACITY;
        Self {
            storage: [0; C],
            position: 0,
        }
    }

    /// Largest number of bytes a single line can hold
    pub const fn max_len(&self) -> usize {
        C - 1
    }

    /// Bytes accepted so far for the line being built
    pub fn pending(&self) -> &[u8] {
        &self.storage[..self.position]
    }

    /// Discard the line being built
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Feed one received byte
    pub fn push(&mut self, byte: u8) -> Accumulate<'_> {
        if is_terminator(byte) {
            if self.position == 0 {
                return Accumulate::Ignored;
            }

            let len = self.position;
            self.storage[len] = 0;
            self.position = 0;
            return Accumulate::Complete(&self.storage[..len]);
        }

        if self.position < self.max_len() {
            self.storage[self.position] = byte;
            self.position += 1;
            Accumulate::Stored
        } else {
            Accumulate::Truncated
        }
    }
}
