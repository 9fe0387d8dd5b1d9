//! Ordered header collection.

use crate::error::{Error, Result};
use std::fmt;

/// Collection of email headers.
///
/// Entries keep the order and spelling they were added with. Lookups are
/// case-insensitive and single-value accessors return the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header value, keeping any existing values.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Sets a header value.
    ///
    /// The first existing entry is overwritten in place and later duplicates
    /// are dropped; a header not yet present is appended.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(index) => {
                self.entries[index].1 = value;
                let mut seen = 0usize;
                self.entries.retain(|(n, _)| {
                    if n.eq_ignore_ascii_case(&name) {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
            }
            None => self.entries.push((name, value)),
        }
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].1.as_str())
    }

    /// Gets all values for a header, in insertion order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns the number of header entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Feeds one line of a header block (without its line ending).
    pub(crate) fn push_line(&mut self, line_number: usize, line: &str) -> Result<()> {
        if line.starts_with(' ') || line.starts_with('\t') {
            let Some((_, value)) = self.entries.last_mut() else {
                return Err(Error::InvalidHeader {
                    line: line_number,
                    text: line.to_string(),
                });
            };
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(line.trim());
            return Ok(());
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(Error::InvalidHeader {
                line: line_number,
                text: line.to_string(),
            });
        };

        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(Error::InvalidHeader {
                line: line_number,
                text: line.to_string(),
            });
        }

        self.add(name, value.trim());
        Ok(())
    }
}

impl fmt::Display for Headers {
    /// Writes one `Name: value` line per entry, CRLF terminated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.add(name, value);
        }
        headers
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::needless_collect)]
mod tests {
    use super::*;

    fn block(text: &str) -> Result<Headers> {
        let mut headers = Headers::new();
        for (index, line) in text.lines().take_while(|l| !l.is_empty()).enumerate() {
            headers.push_line(index + 1, line)?;
        }
        Ok(headers)
    }

    #[test]
    fn test_headers_new() {
        let headers = Headers::new();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_headers_add_get_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(headers.get("Subject"), None);
    }

    #[test]
    fn test_headers_first_match_wins() {
        let mut headers = Headers::new();
        headers.add("Received", "from a");
        headers.add("received", "from b");
        assert_eq!(headers.get("RECEIVED"), Some("from a"));
        assert_eq!(headers.get_all("Received"), vec!["from a", "from b"]);
    }

    #[test]
    fn test_headers_set_keeps_position() {
        let mut headers = Headers::new();
        headers.add("To", "alice@example.com");
        headers.add("Subject", "Hi");
        headers.add("to", "bob@example.com");

        headers.set("TO", "charlie@example.com");
        assert_eq!(headers.get_all("To"), vec!["charlie@example.com"]);

        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["To", "Subject"]);
    }

    #[test]
    fn test_headers_set_appends_missing() {
        let mut headers = Headers::new();
        headers.add("From", "a@example.com");
        headers.set("Date", "Mon, 1 Jan 2024 00:00:00 +0000");
        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["From", "Date"]);
    }

    #[test]
    fn test_header_block() {
        let text = concat!(
            "From: sender@example.com\r\n",
            "To: recipient@example.com\r\n",
            "Subject: Test Message\r\n",
            "Content-Type: text/plain;\r\n",
            " charset=utf-8\r\n",
            "\r\n",
            "Body: not a header\r\n"
        );

        let headers = block(text).unwrap();
        assert_eq!(headers.len(), 4);
        assert_eq!(headers.get("from"), Some("sender@example.com"));
        assert_eq!(headers.get("Subject"), Some("Test Message"));
        assert_eq!(
            headers.get("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(headers.get("Body"), None);
    }

    #[test]
    fn test_header_block_empty_value() {
        let headers = block("Subject:\r\nX-Empty:   \r\n").unwrap();
        assert_eq!(headers.get("Subject"), Some(""));
        assert_eq!(headers.get("X-Empty"), Some(""));
    }

    #[test]
    fn test_header_block_rejects_garbage() {
        let err = block("From: a@example.com\nnot a header\n").unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { line: 2, .. }));
    }

    #[test]
    fn test_header_block_rejects_leading_continuation() {
        let err = block("  folded\nFrom: a@example.com\n").unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { line: 1, .. }));
    }

    #[test]
    fn test_headers_display_preserves_order_and_case() {
        let headers: Headers = [("Subject", "Hi"), ("From", "a@example.com")]
            .into_iter()
            .collect();
        assert_eq!(headers.to_string(), "Subject: Hi\r\nFrom: a@example.com\r\n");
    }
}
