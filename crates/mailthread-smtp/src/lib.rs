//! # mailthread-smtp
//!
//! A small async SMTP submission client: just enough protocol to hand one
//! rendered message to a mail server.
//!
//! ## Features
//!
//! - **Type-state sessions**: greeting, EHLO, authentication and the mail
//!   transaction are separate states, so commands cannot be issued out of order
//! - **TLS**: implicit TLS (port 465) and STARTTLS, via rustls with the
//!   webpki root store
//! - **Authentication**: AUTH PLAIN
//! - **Data transfer**: CRLF normalization and dot-stuffing of the message
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailthread_smtp::{Client, Envelope, Mailbox};
//! use mailthread_smtp::stream::{connect, upgrade_to_tls};
//!
//! #[tokio::main]
//! async fn main() -> mailthread_smtp::Result<()> {
//!     let tcp = connect("smtp.example.com", 587).await?;
//!     let client = Client::greet(tcp).await?.ehlo("localhost").await?;
//!
//!     let tcp = client.starttls().await?;
//!     let tls = upgrade_to_tls(tcp, "smtp.example.com").await?;
//!     let client = Client::greet_after_starttls(tls).ehlo("localhost").await?;
//!
//!     let mut client = client.auth_plain("user@example.com", "password").await?;
//!
//!     let envelope = Envelope::new(
//!         Mailbox::parse("sender@example.com")?.address,
//!         vec![Mailbox::parse("Bob <bob@example.com>")?.address],
//!     );
//!     client.send_mail(&envelope, b"Subject: Hi\r\n\r\nHello!\r\n").await?;
//!     client.quit().await
//! }
//! ```
//!
//! ## Session States
//!
//! ```text
//! Connected ── ehlo() ──→ Ready ── auth_plain() ──→ Authenticated ──┐
//!                           │                            ↑           │
//!                           │                            └ send_mail ┘
//!                           └── starttls() ──→ raw stream (upgrade, greet again)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod capability;
mod client;
mod command;
mod error;
mod reply;
pub mod stream;

pub use address::{Address, Mailbox};
pub use capability::Capabilities;
pub use client::{Authenticated, Client, Connected, Envelope, Ready, encode_data};
pub use command::Command;
pub use error::{Error, Result};
pub use reply::{Reply, ReplyCode, is_last_reply_line, parse_reply};
