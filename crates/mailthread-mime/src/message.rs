//! Splitting a stored message into headers and body.

use crate::error::Result;
use crate::header::Headers;
use std::io::BufRead;

/// A stored message whose header block has been parsed.
///
/// The body is left unread in `body`, positioned just after the blank line
/// that ends the header block.
#[derive(Debug)]
pub struct RawMessage<R> {
    /// Parsed header block.
    pub headers: Headers,
    /// Reader positioned at the start of the body.
    pub body: R,
}

impl<R: BufRead> RawMessage<R> {
    /// Reads the header block from `reader`.
    ///
    /// Accepts both CRLF and LF line endings. Header bytes that are not valid
    /// UTF-8 are replaced rather than rejected. A source that ends before the
    /// blank separator line yields a message with an empty body.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or a header line is malformed.
    pub fn read_from(mut reader: R) -> Result<Self> {
        let mut headers = Headers::new();
        let mut buf = Vec::new();
        let mut line_number = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_number += 1;

            let text = String::from_utf8_lossy(&buf);
            let line = text.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                break;
            }
            headers.push_line(line_number, line)?;
        }

        Ok(Self {
            headers,
            body: reader,
        })
    }
}
