//! # mailthread-core
//!
//! Core logic for the `mailthread` mail reader.
//!
//! This crate provides:
//! - **Message model** - headers, cached plain-text content, rendering and
//!   maildir seen-state transitions
//! - **Mail capability** - one rendering contract shared by messages and
//!   threads
//! - **Threading** - grouping messages into conversations in first-seen order
//! - **Reply composition** - threading headers and quoted replies
//! - **Services** - maildir scanning and SMTP delivery
//! - **Configuration** - SMTP transport settings

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod compose;
pub mod config;
mod error;
pub mod mail;
pub mod message;
pub mod service;
pub mod thread;

pub use compose::{compose_new, compose_reply, compose_reply_unthreaded};
pub use config::{Security, SmtpConfig};
pub use error::{Error, Result};
pub use mail::{Mail, MailItem, PlainStyle, SummaryStyle};
pub use message::{Message, SeenUpdate, StoreMutator};
pub use service::{
    DeliveryError, MaildirStore, ScanFailure, ScanReport, read_message, scan, send_message,
};
pub use thread::{Grouping, Thread, ThreadKey, Threader, ThreadingFailure, ThreadingReport, thread};
