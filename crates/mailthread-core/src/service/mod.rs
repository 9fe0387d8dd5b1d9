//! Services that touch the outside world.
//!
//! The maildir service reads messages from disk and applies seen-state
//! renames; the delivery service hands composed messages to an SMTP server.

pub mod delivery;
pub mod maildir;

pub use delivery::{DeliveryError, deliver, envelope_for, send_message, stamp_date};
pub use maildir::{MaildirStore, ScanFailure, ScanReport, read_message, scan};
