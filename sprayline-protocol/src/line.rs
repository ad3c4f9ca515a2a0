//! Line framing for the console link
//!
//! Bytes are accumulated until `\n`. A `\r` before the newline is dropped
//! so terminals sending CRLF work unchanged.

use heapless::String;

/// Longest accepted command line (excluding terminator)
pub const MAX_LINE_LEN: usize = 96;

/// One complete line
pub type Line = String<MAX_LINE_LEN>;

/// Errors that can occur while framing lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded `MAX_LINE_LEN`; the rest of it is discarded
    Overflow,
    /// Non-ASCII byte received; the line is discarded
    InvalidByte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    /// Collecting bytes of a line
    Collecting,
    /// Dropping bytes until the next newline
    Discarding,
}

/// Incremental line reader
#[derive(Debug, Clone)]
pub struct LineReader {
    state: ReadState,
    buffer: Line,
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LineReader {
    /// Create a new line reader
    pub fn new() -> Self {
        Self {
            state: ReadState::Collecting,
            buffer: String::new(),
        }
    }

    /// Reset the reader state
    pub fn reset(&mut self) {
        self.state = ReadState::Collecting;
        self.buffer.clear();
    }

    /// Feed a single byte to the reader
    ///
    /// Returns `Ok(Some(line))` when a non-empty line is complete,
    /// `Ok(None)` when more bytes are needed, or `Err` when the current
    /// line had to be dropped. Errors are reported once per bad line.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, LineError> {
        match (self.state, byte) {
            (ReadState::Discarding, b'\n') => {
                self.reset();
                Ok(None)
            }
            (ReadState::Discarding, _) => Ok(None),
            (ReadState::Collecting, b'\n') => {
                let line = self.buffer.clone();
                self.reset();
                if line.trim().is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(line))
                }
            }
            (ReadState::Collecting, b'\r') => Ok(None),
            (ReadState::Collecting, b) if !b.is_ascii() => {
                self.buffer.clear();
                self.state = ReadState::Discarding;
                Err(LineError::InvalidByte)
            }
            (ReadState::Collecting, b) => {
                if self.buffer.push(b as char).is_err() {
                    self.buffer.clear();
                    self.state = ReadState::Discarding;
                    return Err(LineError::Overflow);
                }
                Ok(None)
            }
        }
    }

    /// Feed multiple bytes to the reader
    ///
    /// Returns the first complete line found, if any.
    /// Remaining bytes after a complete line are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Line>, LineError> {
        for &byte in bytes {
            if let Some(line) = self.feed(byte)? {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let mut reader = LineReader::new();
        let line = reader.feed_bytes(b"HOME\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "HOME");
    }

    #[test]
    fn test_crlf_stripped() {
        let mut reader = LineReader::new();
        let line = reader.feed_bytes(b"PAUSE\r\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "PAUSE");
    }

    #[test]
    fn test_blank_lines_skipped() {
        let mut reader = LineReader::new();
        assert_eq!(reader.feed_bytes(b"\n\r\n  \n"), Ok(None));
        let line = reader.feed_bytes(b"STATUS\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "STATUS");
    }

    #[test]
    fn test_overflow_discards_until_newline() {
        let mut reader = LineReader::new();
        let long = [b'A'; MAX_LINE_LEN + 1];
        assert_eq!(reader.feed_bytes(&long), Err(LineError::Overflow));
        // Tail of the oversized line is swallowed silently
        assert_eq!(reader.feed_bytes(b"AAAA\n"), Ok(None));
        let line = reader.feed_bytes(b"RESUME\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "RESUME");
    }

    #[test]
    fn test_invalid_byte_drops_line() {
        let mut reader = LineReader::new();
        assert_eq!(reader.feed_bytes(&[b'H', 0xFF]), Err(LineError::InvalidByte));
        assert_eq!(reader.feed_bytes(b"OME\n"), Ok(None));
        let line = reader.feed_bytes(b"HOME\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "HOME");
    }

    #[test]
    fn test_line_split_across_reads() {
        let mut reader = LineReader::new();
        assert_eq!(reader.feed_bytes(b"PAINT_"), Ok(None));
        assert_eq!(reader.feed_bytes(b"SIDE_"), Ok(None));
        let line = reader.feed_bytes(b"2\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "PAINT_SIDE_2");
    }
}
