//! Message model.
//!
//! A [`Message`] owns its ordered headers and raw body, and caches the
//! plain-text content extracted from the body when it is built.

use crate::error::{Error, Result};
use crate::mail::{Mail, SummaryStyle};
use mailthread_mime::{Headers, RawMessage, extract_plain_text};
use std::fmt;
use std::io::{self, BufRead, Read};

/// Marker separating a maildir base name from its info flags.
const INFO_MARKER: &str = ":2";

/// Flag character for a message that has been read.
const SEEN_FLAG: char = 'S';

/// Applies storage renames on behalf of the message model.
///
/// The model only computes names; implementors own the actual store.
pub trait StoreMutator {
    /// Renames the entry stored as `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot apply the rename.
    fn rename(&mut self, from: &str, to: &str) -> io::Result<()>;
}

/// A storage rename that was applied by [`Message::mark_seen`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenUpdate {
    /// Storage name before the update.
    pub from: String,
    /// Storage name after the update.
    pub to: String,
}

/// A single email message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    headers: Headers,
    raw_body: String,
    content: String,
    storage_name: Option<String>,
}

impl Message {
    /// Builds a message by reading `body` to the end.
    ///
    /// Bytes that are not valid UTF-8 are replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContentRead`] if the body cannot be fully read.
    pub fn read(headers: Headers, mut body: impl Read) -> Result<Self> {
        let mut bytes = Vec::new();
        body.read_to_end(&mut bytes).map_err(Error::ContentRead)?;

        let raw_body = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    message_id = headers.get("Message-ID").unwrap_or_default(),
                    "message body is not valid UTF-8, replacing invalid bytes"
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        Ok(Self::from_parts(headers, raw_body))
    }

    /// Parses a complete stored message (header block, blank line, body).
    ///
    /// # Errors
    ///
    /// Returns an error if the header block is malformed or the body cannot
    /// be read.
    pub fn parse(reader: impl BufRead) -> Result<Self> {
        let raw = RawMessage::read_from(reader)?;
        Self::read(raw.headers, raw.body)
    }

    /// Builds a message from headers and an in-memory body.
    #[must_use]
    pub fn from_parts(headers: Headers, raw_body: impl Into<String>) -> Self {
        let raw_body = raw_body.into();
        let content = extract_plain_text(headers.get("Content-Type"), &raw_body);
        Self {
            headers,
            raw_body,
            content,
            storage_name: None,
        }
    }

    /// Ties the message to its entry in the backing store.
    #[must_use]
    pub fn with_storage_name(mut self, name: impl Into<String>) -> Self {
        self.storage_name = Some(name.into());
        self
    }

    /// Returns a copy with header `name` set to `value`.
    ///
    /// Content is re-extracted, since `Content-Type` may have changed.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self.content = extract_plain_text(self.headers.get("Content-Type"), &self.raw_body);
        self
    }

    /// Gets the first value of a header (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Returns all headers in their original order.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the `Subject` header.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.header("Subject")
    }

    /// Returns the `From` header.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.header("From")
    }

    /// Returns the `To` header.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.header("To")
    }

    /// Returns the `Date` header.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.header("Date")
    }

    /// Returns the `Message-ID` header.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.header("Message-ID")
    }

    /// Returns the `References` header.
    #[must_use]
    pub fn references(&self) -> Option<&str> {
        self.header("References")
    }

    /// Returns the extracted plain-text body.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the body as received.
    #[must_use]
    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// Returns the storage name, if the message came from a store.
    #[must_use]
    pub fn storage_name(&self) -> Option<&str> {
        self.storage_name.as_deref()
    }

    /// Returns `true` if the storage name carries the seen flag.
    #[must_use]
    pub fn is_seen(&self) -> bool {
        self.storage_name
            .as_deref()
            .and_then(|name| name.split_once(INFO_MARKER))
            .is_some_and(|(_, flags)| flags.contains(SEEN_FLAG))
    }

    /// Marks the message as seen.
    ///
    /// Computes the new storage name and asks `store` to apply it. Returns
    /// `None` when the message was already seen, in which case the store is
    /// not touched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotStored`] without a storage name,
    /// [`Error::MalformedStorageName`] if the name has no single `:2`
    /// marker, or [`Error::Io`] if the store rejects the rename.
    pub fn mark_seen<M>(&mut self, store: &mut M) -> Result<Option<SeenUpdate>>
    where
        M: StoreMutator + ?Sized,
    {
        let current = self.storage_name.as_deref().ok_or(Error::NotStored)?;
        let Some(next) = seen_storage_name(current)? else {
            return Ok(None);
        };

        store.rename(current, &next)?;
        tracing::debug!(from = current, to = %next, "marked message seen");

        let update = SeenUpdate {
            from: current.to_string(),
            to: next.clone(),
        };
        self.storage_name = Some(next);
        Ok(Some(update))
    }

    /// Renders headers and raw body as RFC 5322 text with CRLF headers.
    #[must_use]
    pub fn to_rfc5322(&self) -> String {
        format!("{}\r\n{}", self.headers, self.raw_body)
    }
}

/// Computes the storage name of a message after it has been read.
///
/// Returns `None` when the name already carries the seen flag.
///
/// # Errors
///
/// Returns [`Error::MalformedStorageName`] unless `name` contains exactly one
/// `:2` marker.
pub fn seen_storage_name(name: &str) -> Result<Option<String>> {
    let malformed = || Error::MalformedStorageName {
        name: name.to_string(),
    };

    let (base, flags) = name.split_once(INFO_MARKER).ok_or_else(malformed)?;
    if flags.contains(INFO_MARKER) {
        return Err(malformed());
    }

    if flags.contains(SEEN_FLAG) {
        return Ok(None);
    }

    let separator = if flags.is_empty() || flags.ends_with(',') {
        ""
    } else {
        ","
    };
    Ok(Some(format!("{base}{INFO_MARKER}{flags}{separator}{SEEN_FLAG}")))
}

impl Mail for Message {
    fn render_full(&self) -> String {
        format!(
            "From: {}\nTo: {}\nDate: {}\nSubject: {}\n\n{}",
            self.from().unwrap_or_default(),
            self.to().unwrap_or_default(),
            self.date().unwrap_or_default(),
            self.subject().unwrap_or_default(),
            self.content
        )
    }

    fn summary_with(&self, style: &dyn SummaryStyle) -> String {
        format!(
            "{} from {}",
            style.subject(self.subject().unwrap_or_default()),
            style.sender(self.from().unwrap_or_default())
        )
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_full())
    }
}
