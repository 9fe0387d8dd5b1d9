//! # mailthread-mime
//!
//! Header access and plain-text body extraction for locally stored mail.
//!
//! This crate deliberately stops short of full MIME decoding. It provides:
//!
//! - **Headers**: an ordered, case-insensitive, multi-valued header collection
//! - **Raw messages**: splitting a stored message into its header block and a
//!   body reader
//! - **Content types**: parsing `type/subtype; key=value` header values
//! - **Plain-text extraction**: a line-oriented heuristic that keeps the
//!   `text/plain` part of a single-boundary multipart body
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::io::Read;
//! use mailthread_mime::{RawMessage, extract_plain_text};
//!
//! let stored = "From: a@example.com\r\n\
//!               Subject: Hello\r\n\
//!               Content-Type: text/plain\r\n\
//!               \r\n\
//!               Hi there!\r\n";
//!
//! let mut raw = RawMessage::read_from(stored.as_bytes())?;
//! let mut body = String::new();
//! raw.body.read_to_string(&mut body)?;
//!
//! let text = extract_plain_text(raw.headers.get("Content-Type"), &body);
//! assert_eq!(text, "Hi there!\r\n");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod extract;
mod header;
mod message;

pub use content_type::ContentType;
pub use error::{Error, Result};
pub use extract::{Delimiter, extract_plain_text};
pub use header::Headers;
pub use message::RawMessage;
