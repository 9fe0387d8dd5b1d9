//! The shared rendering contract for messages and threads.

use crate::message::Message;
use crate::thread::Thread;

/// Decorates summary fields for display.
///
/// The core only ships [`PlainStyle`]; terminal coloring lives with the
/// front end.
pub trait SummaryStyle {
    /// Decorates the subject.
    fn subject(&self, subject: &str) -> String;
    /// Decorates the sender.
    fn sender(&self, sender: &str) -> String;
}

/// Leaves summary fields untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStyle;

impl SummaryStyle for PlainStyle {
    fn subject(&self, subject: &str) -> String {
        subject.to_string()
    }

    fn sender(&self, sender: &str) -> String {
        sender.to_string()
    }
}

/// Anything that can be shown in a list and opened in full.
pub trait Mail {
    /// Full rendering, as shown when the item is opened.
    fn render_full(&self) -> String;

    /// One-line summary with decorated fields.
    fn summary_with(&self, style: &dyn SummaryStyle) -> String;

    /// One-line summary without decoration.
    fn summary(&self) -> String {
        self.summary_with(&PlainStyle)
    }
}

/// A single message or a whole thread, for mixed listings.
#[derive(Debug, Clone)]
pub enum MailItem {
    /// A single message.
    Message(Message),
    /// A conversation.
    Thread(Thread),
}

impl MailItem {
    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Thread(_) => "thread",
        }
    }
}

impl Mail for MailItem {
    fn render_full(&self) -> String {
        match self {
            Self::Message(m) => m.render_full(),
            Self::Thread(t) => t.render_full(),
        }
    }

    fn summary_with(&self, style: &dyn SummaryStyle) -> String {
        match self {
            Self::Message(m) => m.summary_with(style),
            Self::Thread(t) => t.summary_with(style),
        }
    }
}

impl From<Message> for MailItem {
    fn from(message: Message) -> Self {
        Self::Message(message)
    }
}

impl From<Thread> for MailItem {
    fn from(thread: Thread) -> Self {
        Self::Thread(thread)
    }
}
