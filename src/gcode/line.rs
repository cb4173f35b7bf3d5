//! Byte-at-a-time line assembly.

use crate::error::DecodeError;

/// Default line capacity in bytes.
pub const LINE_CAPACITY: usize = 256;

/// Collects incoming bytes into lines.
///
/// A line ends at `\n`, `\r` or `\r\n`. The `\n` of a CRLF pair is swallowed
/// and reports nothing new. The completed line stays readable until the next
/// non-terminator byte, which starts a new line.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer<const N: usize = LINE_CAPACITY> {
    /// Bytes of the current line, terminator excluded.
    bytes: heapless::Vec<u8, N>,

    /// A full line is ready.
    complete: bool,

    /// Previous byte was `\r`.
    after_cr: bool,

    /// Dropping the remainder of an overlong line.
    discarding: bool,
}

impl<const N: usize> LineBuffer<N> {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            bytes: heapless::Vec::new(),
            complete: false,
            after_cr: false,
            discarding: false,
        }
    }

    /// Buffer capacity in bytes.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Add one byte.
    ///
    /// Returns `Ok(true)` when a complete line is available.
    ///
    /// # Errors
    ///
    /// Returns `LineOverflow` when the line outgrows the buffer. The partial
    /// line is dropped and so is everything up to the next terminator.
    pub fn push(&mut self, byte: u8) -> Result<bool, DecodeError> {
        if byte == b'\n' && self.after_cr {
            self.after_cr = false;
            return Ok(false);
        }

        if byte == b'\r' || byte == b'\n' {
            self.after_cr = byte == b'\r';

            if self.discarding {
                self.discarding = false;
                return Ok(false);
            }

            if self.complete {
                // Blank line right after another one.
                self.bytes.clear();
            }
            self.complete = true;
            return Ok(true);
        }

        self.after_cr = false;

        if self.discarding {
            return Ok(false);
        }

        if self.complete {
            self.bytes.clear();
            self.complete = false;
        }

        if self.bytes.push(byte).is_err() {
            warn!("line longer than {} bytes dropped", N);
            self.bytes.clear();
            self.discarding = true;
            return Err(DecodeError::LineOverflow { capacity: N });
        }

        Ok(false)
    }

    /// Bytes of the current line.
    #[inline]
    pub fn line(&self) -> &[u8] {
        &self.bytes
    }

    /// Check if a complete line is available.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Forget everything, including a pending overflow.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.complete = false;
        self.after_cr = false;
        self.discarding = false;
    }
}
