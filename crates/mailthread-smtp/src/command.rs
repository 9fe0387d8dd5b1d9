//! SMTP commands.

use crate::address::Address;
use std::fmt;

/// SMTP command issued by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// EHLO - extended greeting.
    Ehlo {
        /// Client hostname.
        hostname: String,
    },
    /// STARTTLS - upgrade to TLS.
    StartTls,
    /// AUTH PLAIN with an initial response.
    AuthPlain {
        /// Base64-encoded `\0user\0password`.
        initial_response: String,
    },
    /// MAIL FROM - open a transaction.
    MailFrom(Address),
    /// RCPT TO - add a recipient.
    RcptTo(Address),
    /// DATA - begin message data.
    Data,
    /// QUIT - close the session.
    Quit,
}

impl Command {
    /// Serializes the command line, CRLF terminated.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        format!("{self}\r\n").into_bytes()
    }

    /// Name used in logs; never includes credentials.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Ehlo { .. } => "EHLO",
            Self::StartTls => "STARTTLS",
            Self::AuthPlain { .. } => "AUTH PLAIN",
            Self::MailFrom(_) => "MAIL FROM",
            Self::RcptTo(_) => "RCPT TO",
            Self::Data => "DATA",
            Self::Quit => "QUIT",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ehlo { hostname } => write!(f, "EHLO {hostname}"),
            Self::StartTls => f.write_str("STARTTLS"),
            Self::AuthPlain { initial_response } => write!(f, "AUTH PLAIN {initial_response}"),
            Self::MailFrom(from) => write!(f, "MAIL FROM:<{from}>"),
            Self::RcptTo(to) => write!(f, "RCPT TO:<{to}>"),
            Self::Data => f.write_str("DATA"),
            Self::Quit => f.write_str("QUIT"),
        }
    }
}
