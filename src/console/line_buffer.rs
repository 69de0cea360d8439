//! Line buffer for console input

use super::ConsoleError;

/// Buffer capacity, including the conceptual terminator.
pub const LINE_CAPACITY: usize = 64;

/// Longest line the buffer holds.
pub const MAX_LINE_LEN: usize = LINE_CAPACITY - 1;

/// Line input buffer
///
/// Holds at most [`MAX_LINE_LEN`] bytes. A push past that is refused with
/// [`ConsoleError::LineTooLong`]; deciding what to do next is up to the caller.
pub struct LineBuffer {
    buf: [u8; LINE_CAPACITY],
    len: usize,
}

impl LineBuffer {
    /// Create empty buffer
    pub const fn new() -> Self {
        Self {
            buf: [0u8; LINE_CAPACITY],
            len: 0,
        }
    }

    /// Append a byte
    pub fn push(&mut self, c: u8) -> Result<(), ConsoleError> {
        if self.len >= MAX_LINE_LEN {
            return Err(ConsoleError::LineTooLong);
        }
        self.buf[self.len] = c;
        self.len += 1;
        Ok(())
    }

    /// Clear buffer
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Get buffer as string slice, empty if the bytes are not UTF-8
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.as_bytes()).unwrap_or("")
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True once another push would be refused
    pub fn is_full(&self) -> bool {
        self.len >= MAX_LINE_LEN
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
