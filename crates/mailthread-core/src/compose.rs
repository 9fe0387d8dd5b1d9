//! Building outgoing messages.
//!
//! Replies carry `In-Reply-To` and `References` so that receiving clients
//! can thread them, and quote the original's extracted text.

use crate::error::{Error, Result};
use crate::message::Message;
use crate::thread::strip_reply_prefix;
use mailthread_mime::{ContentType, Headers};

/// Builds a reply to `original` from `from`, with `body` as the new text.
///
/// # Errors
///
/// Returns [`Error::MissingIdentity`] if the original has no usable `From`
/// or `Message-ID`; see [`compose_reply_unthreaded`] to reply anyway.
pub fn compose_reply(original: &Message, from: &str, body: &str) -> Result<Message> {
    let to = non_blank(original.from()).ok_or(Error::MissingIdentity { header: "From" })?;
    let message_id = non_blank(original.message_id()).ok_or(Error::MissingIdentity {
        header: "Message-ID",
    })?;

    let references = match non_blank(original.references()) {
        Some(existing) => format!("{existing} {message_id}"),
        None => message_id.to_string(),
    };

    let mut headers = Headers::new();
    headers.add("From", from);
    headers.add("To", to);
    headers.add("Subject", reply_subject(original.subject().unwrap_or_default()));
    headers.add("In-Reply-To", message_id);
    headers.add("References", references);
    headers.add("Content-Type", ContentType::text_plain().to_string());

    Ok(Message::from_parts(headers, reply_body(original, body)))
}

/// Builds a reply without threading headers.
///
/// `To` is left out when the original has no sender.
#[must_use]
pub fn compose_reply_unthreaded(original: &Message, from: &str, body: &str) -> Message {
    let mut headers = Headers::new();
    headers.add("From", from);
    if let Some(to) = non_blank(original.from()) {
        headers.add("To", to);
    }
    headers.add("Subject", reply_subject(original.subject().unwrap_or_default()));
    headers.add("Content-Type", ContentType::text_plain().to_string());

    Message::from_parts(headers, reply_body(original, body))
}

/// Builds a new plain-text message.
#[must_use]
pub fn compose_new(to: &str, from: &str, subject: &str, body: &str) -> Message {
    let mut headers = Headers::new();
    headers.add("From", from);
    headers.add("To", to);
    headers.add("Subject", subject);
    headers.add("Content-Type", ContentType::text_plain().to_string());

    Message::from_parts(headers, body)
}

/// Prefixes `subject` with `RE: ` unless it already carries a `Re:` prefix.
#[must_use]
pub fn reply_subject(subject: &str) -> String {
    let trimmed = subject.trim_start();
    let already_reply = trimmed
        .get(..2)
        .is_some_and(|word| word.eq_ignore_ascii_case("re"))
        && strip_reply_prefix(trimmed).is_some();

    if already_reply {
        subject.to_string()
    } else {
        format!("RE: {subject}")
    }
}

/// Prefixes every line of `text` with `> `.
#[must_use]
pub fn quote(text: &str) -> String {
    text.lines().fold(String::with_capacity(text.len()), |mut out, line| {
        out.push_str("> ");
        out.push_str(line);
        out.push('\n');
        out
    })
}

fn reply_body(original: &Message, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + original.content().len() + 16);
    out.push_str(body);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&quote(original.content()));
    out
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
