//! Conversation threading.
//!
//! Messages are grouped by a key derived from each message. The first
//! message with a given key starts a thread and stays its representative;
//! later messages with the same key are appended in arrival order. Threads
//! come back in the order their keys were first seen.

use crate::error::Error;
use crate::mail::{Mail, MailItem, PlainStyle, SummaryStyle};
use crate::message::Message;
use std::collections::HashMap;
use std::fmt;

/// How messages are grouped into threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grouping {
    /// Normalized subject with reply/forward prefixes removed.
    #[default]
    Subject,
    /// The full undecorated summary line (subject and sender).
    Summary,
}

impl Grouping {
    /// Computes the grouping key of a message.
    #[must_use]
    pub fn key(self, message: &Message) -> ThreadKey {
        match self {
            Self::Subject => ThreadKey(normalize_subject(message.subject().unwrap_or_default())),
            Self::Summary => ThreadKey(message.summary_with(&PlainStyle)),
        }
    }
}

/// Key shared by every member of a thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadKey(String);

impl ThreadKey {
    /// Returns the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes a subject for grouping.
///
/// Leading `Re:`, `Fw:` and `Fwd:` prefixes are removed repeatedly, with an
/// optional counter such as `Re[2]:`. Whitespace runs collapse to one space
/// and the result is lowercased.
#[must_use]
pub fn normalize_subject(subject: &str) -> String {
    let mut rest = subject.trim_start();
    while let Some(stripped) = strip_reply_prefix(rest) {
        rest = stripped.trim_start();
    }

    rest.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Strips one reply/forward prefix, if `subject` starts with one.
pub(crate) fn strip_reply_prefix(subject: &str) -> Option<&str> {
    let word_len = subject
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .count();
    let word = subject[..word_len].to_ascii_lowercase();
    if !matches!(word.as_str(), "re" | "fw" | "fwd") {
        return None;
    }

    let mut rest = &subject[word_len..];
    if let Some(counter) = rest.strip_prefix('[') {
        let (digits, after) = counter.split_once(']')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        rest = after;
    }

    rest.strip_prefix(':')
}

/// A conversation: messages sharing one key, in arrival order.
///
/// A thread is never empty; its first message is the representative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    key: ThreadKey,
    messages: Vec<Message>,
}

impl Thread {
    /// Starts a thread with `first` as its representative, keyed the way
    /// `grouping` keys it.
    #[must_use]
    pub fn new(grouping: Grouping, first: Message) -> Self {
        Self::start(grouping.key(&first), first)
    }

    fn start(key: ThreadKey, first: Message) -> Self {
        Self {
            key,
            messages: vec![first],
        }
    }

    /// Returns the grouping key.
    #[must_use]
    pub const fn key(&self) -> &ThreadKey {
        &self.key
    }

    /// Returns the message that started the thread.
    #[must_use]
    pub fn representative(&self) -> &Message {
        &self.messages[0]
    }

    /// Returns the most recently appended message.
    #[must_use]
    pub fn latest(&self) -> &Message {
        &self.messages[self.messages.len() - 1]
    }

    /// Returns all members in arrival order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns all members mutably, e.g. to mark them seen.
    pub fn messages_mut(&mut self) -> &mut [Message] {
        &mut self.messages
    }

    /// Returns the number of members.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

impl Mail for Thread {
    fn render_full(&self) -> String {
        let mut out = self.representative().render_full();
        let more = self.messages.len() - 1;
        if more > 0 {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            let noun = if more == 1 { "message" } else { "messages" };
            out.push_str(&format!("[{more} more {noun} in this thread]\n"));
        }
        out
    }

    fn summary_with(&self, style: &dyn SummaryStyle) -> String {
        self.representative().summary_with(style)
    }
}

/// An input item the threading engine could not accept.
#[derive(Debug)]
pub struct ThreadingFailure {
    /// Position of the item in the input.
    pub index: usize,
    /// Why it was rejected.
    pub error: Error,
}

/// Result of one threading pass.
#[derive(Debug, Default)]
pub struct ThreadingReport {
    /// Threads in first-seen key order.
    pub threads: Vec<Thread>,
    /// Items that were skipped.
    pub failures: Vec<ThreadingFailure>,
}

/// Groups messages into threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Threader {
    grouping: Grouping,
}

impl Threader {
    /// Creates a threader using `grouping`.
    #[must_use]
    pub const fn new(grouping: Grouping) -> Self {
        Self { grouping }
    }

    /// Threads a mixed sequence.
    ///
    /// Items that are already threads are rejected with
    /// [`Error::InvalidMailType`] and reported; the rest are threaded.
    pub fn thread<I>(&self, items: I) -> ThreadingReport
    where
        I: IntoIterator<Item = MailItem>,
    {
        let mut failures = Vec::new();
        let messages = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                MailItem::Message(message) => Some(message),
                other @ MailItem::Thread(_) => {
                    tracing::warn!(index, kind = other.kind(), "skipping non-message item");
                    failures.push(ThreadingFailure {
                        index,
                        error: Error::InvalidMailType {
                            index,
                            found: other.kind(),
                        },
                    });
                    None
                }
            });

        let threads = self.thread_messages(messages);
        ThreadingReport { threads, failures }
    }

    /// Threads a sequence of messages.
    pub fn thread_messages<I>(&self, messages: I) -> Vec<Thread>
    where
        I: IntoIterator<Item = Message>,
    {
        let mut threads: Vec<Thread> = Vec::new();
        let mut by_key: HashMap<ThreadKey, usize> = HashMap::new();

        for message in messages {
            let key = self.grouping.key(&message);
            if let Some(&slot) = by_key.get(&key) {
                tracing::debug!(key = %key, "appending to thread");
                threads[slot].push(message);
            } else {
                tracing::debug!(key = %key, "new thread");
                by_key.insert(key.clone(), threads.len());
                threads.push(Thread::start(key, message));
            }
        }

        tracing::debug!(threads = threads.len(), grouping = ?self.grouping, "threading done");
        threads
    }
}

/// Threads `items` with the default subject grouping.
pub fn thread<I>(items: I) -> ThreadingReport
where
    I: IntoIterator<Item = MailItem>,
{
    Threader::default().thread(items)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailthread_mime::Headers;
    use proptest::prelude::*;

    fn msg(subject: &str, from: &str) -> Message {
        let headers: Headers = [("Subject", subject), ("From", from)].into_iter().collect();
        Message::from_parts(headers, format!("{subject} / {from}\n"))
    }

    #[test]
    fn test_normalize_subject() {
        assert_eq!(normalize_subject("Sample"), "sample");
        assert_eq!(normalize_subject("Re: Sample"), "sample");
        assert_eq!(normalize_subject("RE: re:  Sample"), "sample");
        assert_eq!(normalize_subject("Fwd: Re[2]: Big   News "), "big news");
        assert_eq!(normalize_subject("fw:Sample"), "sample");
        assert_eq!(normalize_subject("Regarding: x"), "regarding: x");
        assert_eq!(normalize_subject("Re[x]: y"), "re[x]: y");
        assert_eq!(normalize_subject(""), "");
    }

    #[test]
    fn test_reply_joins_root_by_subject() {
        let m1 = msg("Sample", "A");
        let m2 = msg("Re: Sample", "B");

        let report = thread([MailItem::from(m1.clone()), MailItem::from(m2.clone())]);
        assert!(report.failures.is_empty());
        assert_eq!(report.threads.len(), 1);

        let t = &report.threads[0];
        assert_eq!(t.representative(), &m1);
        assert_eq!(t.latest(), &m2);
        assert_eq!(t.messages(), &[m1, m2]);
    }

    #[test]
    fn test_reply_stays_apart_by_summary() {
        let m1 = msg("Sample", "A");
        let m2 = msg("Re: Sample", "B");
        let m3 = msg("Sample", "A");

        let threads = Threader::new(Grouping::Summary).thread_messages([m1, m2, m3]);
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].message_count(), 2);
        assert_eq!(threads[0].key().as_str(), "Sample from A");
        assert_eq!(threads[1].key().as_str(), "Re: Sample from B");
    }

    #[test]
    fn test_same_subject_different_sender() {
        let threads = Threader::default().thread_messages([msg("Hi", "A"), msg("Hi", "B")]);
        assert_eq!(threads.len(), 1);

        let threads =
            Threader::new(Grouping::Summary).thread_messages([msg("Hi", "A"), msg("Hi", "B")]);
        assert_eq!(threads.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let report = thread(Vec::<MailItem>::new());
        assert!(report.threads.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_thread_items_are_rejected() {
        let existing = Thread::new(Grouping::Subject, msg("x", "A"));
        let report = thread([
            MailItem::from(msg("a", "A")),
            MailItem::from(existing),
            MailItem::from(msg("Re: a", "B")),
        ]);

        assert_eq!(report.threads.len(), 1);
        assert_eq!(report.threads[0].message_count(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert!(matches!(
            report.failures[0].error,
            Error::InvalidMailType {
                index: 1,
                found: "thread"
            }
        ));
    }

    #[test]
    fn test_repeated_calls_do_not_share_state() {
        let threader = Threader::default();
        let first = threader.thread_messages([msg("a", "A")]);
        let second = threader.thread_messages([msg("a", "B")]);
        assert_eq!(first[0].message_count(), 1);
        assert_eq!(second[0].message_count(), 1);
    }

    #[test]
    fn test_new_thread_is_keyed_by_grouping() {
        let reply = msg("Re: Fwd: Lunch", "A");

        let by_subject = Thread::new(Grouping::Subject, reply.clone());
        assert_eq!(by_subject.key(), &Grouping::Subject.key(&reply));
        assert_eq!(by_subject.key().as_str(), "lunch");

        let by_summary = Thread::new(Grouping::Summary, reply.clone());
        assert_eq!(by_summary.key(), &Grouping::Summary.key(&reply));
        assert_eq!(by_summary.key().as_str(), "Re: Fwd: Lunch from A");

        let threads = Threader::default().thread_messages([reply, msg("lunch", "B")]);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].key(), by_subject.key());
    }

    #[test]
    fn test_thread_rendering() {
        let single = Thread::new(Grouping::Subject, msg("a", "A"));
        assert_eq!(single.render_full(), single.representative().render_full());
        assert_eq!(single.summary(), "a from A");

        let threads = Threader::default().thread_messages([
            msg("a", "A"),
            msg("Re: a", "B"),
            msg("Re: a", "C"),
        ]);
        let rendered = threads[0].render_full();
        assert!(rendered.starts_with("From: A\n"));
        assert!(rendered.ends_with("a / A\n[2 more messages in this thread]\n"));
        assert_eq!(threads[0].summary(), "a from A");
    }

    fn subjects() -> impl Strategy<Value = Vec<(usize, usize)>> {
        prop::collection::vec((0usize..4, 0usize..3), 0..24)
    }

    fn build(input: &[(usize, usize)]) -> Vec<Message> {
        const SUBJECTS: [&str; 4] = ["alpha", "Re: alpha", "beta", "gamma"];
        input
            .iter()
            .enumerate()
            .map(|(i, &(s, f))| {
                let headers: Headers = [
                    ("Subject", SUBJECTS[s].to_string()),
                    ("From", format!("sender{f}")),
                    ("Message-ID", format!("<{i}@test>")),
                ]
                .into_iter()
                .collect();
                Message::from_parts(headers, "")
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_threads_follow_first_seen_keys(input in subjects(), summary in any::<bool>()) {
            let grouping = if summary { Grouping::Summary } else { Grouping::Subject };
            let messages = build(&input);
            let threads = Threader::new(grouping).thread_messages(messages.clone());

            let mut first_seen: Vec<ThreadKey> = Vec::new();
            for m in &messages {
                let key = grouping.key(m);
                if !first_seen.contains(&key) {
                    first_seen.push(key);
                }
            }
            let keys: Vec<ThreadKey> = threads.iter().map(|t| t.key().clone()).collect();
            prop_assert_eq!(keys, first_seen);

            for t in &threads {
                let expected: Vec<&Message> = messages
                    .iter()
                    .filter(|m| &grouping.key(m) == t.key())
                    .collect();
                let actual: Vec<&Message> = t.messages().iter().collect();
                prop_assert_eq!(actual, expected.clone());
                prop_assert_eq!(t.representative(), expected[0]);
                for member in t.messages() {
                    prop_assert_eq!(&grouping.key(member), t.key());
                }
            }

            let total: usize = threads.iter().map(Thread::message_count).sum();
            prop_assert_eq!(total, messages.len());
        }
    }
}
