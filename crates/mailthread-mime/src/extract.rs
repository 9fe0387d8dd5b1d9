//! Plain-text body extraction.
//!
//! This is a line heuristic rather than a MIME parser. It handles a single
//! boundary level where the readable text is announced by an explicit
//! `Content-Type: text/plain` part header. Text that follows a non-text part
//! without such a header is dropped, and any preamble before the first
//! boundary is kept.
//!
//! Part header markers are matched with their canonical capitalization, so
//! prose that merely mentions a lowercase `content-type:` is still text.

use crate::content_type::ContentType;

const CONTENT_TYPE: &str = "Content-Type:";
const TRANSFER_ENCODING: &str = "Content-Transfer-Encoding:";

/// Boundary delimiter lines derived from a `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiter {
    open: String,
    close: String,
}

impl Delimiter {
    /// Builds the delimiter for a boundary value.
    #[must_use]
    pub fn new(boundary: &str) -> Self {
        Self {
            open: format!("--{boundary}"),
            close: format!("--{boundary}--"),
        }
    }

    /// Reads the boundary parameter of a `Content-Type` header value.
    ///
    /// Returns `None` when the value does not parse or carries no boundary.
    #[must_use]
    pub fn from_content_type(value: &str) -> Option<Self> {
        ContentType::parse(value)
            .ok()
            .and_then(|ct| ct.boundary().map(Self::new))
    }

    /// Checks whether a line, with its CR/LF ending removed, is exactly a
    /// delimiter line.
    #[must_use]
    pub fn matches(&self, line: &str) -> bool {
        line == self.open || line == self.close
    }
}

/// Whether a part header value announces `text/plain`.
fn announces_plain_text(value: &str) -> bool {
    value.contains("text/plain") || ContentType::parse(value).is_ok_and(|ct| ct.is_text_plain())
}

/// Extracts the readable plain-text body from a raw payload.
///
/// `content_type` is the message's `Content-Type` header value, if any.
/// Emitted lines keep their original line endings.
#[must_use]
pub fn extract_plain_text(content_type: Option<&str>, body: &str) -> String {
    let delimiter = content_type.and_then(Delimiter::from_content_type);

    let mut text = String::with_capacity(body.len());
    let mut emit = true;

    for line in body.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\r', '\n']);

        if let Some((_, value)) = bare.split_once(CONTENT_TYPE) {
            emit = announces_plain_text(value);
            continue;
        }

        if bare.contains(TRANSFER_ENCODING) {
            continue;
        }

        if delimiter.as_ref().is_some_and(|d| d.matches(bare)) {
            continue;
        }

        if emit {
            text.push_str(line);
        }
    }

    text
}
