//! Error types for header and message parsing.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A header line is neither `Name: value` nor a folded continuation.
    #[error("Invalid header line {line}: {text:?}")]
    InvalidHeader {
        /// 1-based line number within the header block.
        line: usize,
        /// The offending line, without its line ending.
        text: String,
    },

    /// Invalid content type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// Reading the message source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
