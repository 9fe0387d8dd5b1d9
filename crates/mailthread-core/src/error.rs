//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
///
/// Every variant concerns a single item (one message, one thread, one file);
/// batch operations collect them per item instead of aborting.
#[derive(Debug, Error)]
pub enum Error {
    /// The message body stream could not be read to the end.
    #[error("Failed to read message body: {0}")]
    ContentRead(#[source] std::io::Error),

    /// A storage name lacks the maildir `:2` info marker.
    #[error("Storage name {name:?} does not contain exactly one ':2' marker")]
    MalformedStorageName {
        /// The offending storage name.
        name: String,
    },

    /// Seen-state was requested for a message that has no backing store entry.
    #[error("Message is not backed by a store entry")]
    NotStored,

    /// A non-message item reached the threading engine.
    #[error("Item {index} is a {found}, expected a single message")]
    InvalidMailType {
        /// Position of the item in the input sequence.
        index: usize,
        /// Kind of item that was found.
        found: &'static str,
    },

    /// The original message lacks a header needed for reply threading.
    #[error("Cannot build reply headers: original message has no {header} header")]
    MissingIdentity {
        /// Name of the missing header.
        header: &'static str,
    },

    /// The stored message could not be parsed.
    #[error("Message parse error: {0}")]
    Mime(#[from] mailthread_mime::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
