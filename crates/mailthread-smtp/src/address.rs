//! Email address types.

use crate::error::{Error, Result};

/// Email address for the SMTP envelope (`local@domain`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new address from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is empty, has no single `@`, or has an
    /// empty local or domain part.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        Self::validate(&addr)?;
        Ok(Self(addr))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(addr: &str) -> Result<()> {
        if addr.is_empty() {
            return Err(Error::InvalidAddress("Address cannot be empty".into()));
        }

        if addr.contains(|c: char| c.is_whitespace() || c == '<' || c == '>') {
            return Err(Error::InvalidAddress(format!(
                "Address contains invalid characters: {addr}"
            )));
        }

        match addr.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                if domain.contains('@') {
                    Err(Error::InvalidAddress(format!(
                        "Address must have exactly one @: {addr}"
                    )))
                } else {
                    Ok(())
                }
            }
            Some(_) => Err(Error::InvalidAddress(format!(
                "Local and domain parts cannot be empty: {addr}"
            ))),
            None => Err(Error::InvalidAddress(format!(
                "Address must contain @: {addr}"
            ))),
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mailbox as written in a header: optional display name plus address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    /// Display name (optional).
    pub name: Option<String>,
    /// Email address.
    pub address: Address,
}

impl Mailbox {
    /// Parses `addr@example.com` or `Display Name <addr@example.com>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the angle brackets are unbalanced or the address
    /// is invalid.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();

        let Some(open) = text.rfind('<') else {
            return Ok(Self {
                name: None,
                address: Address::new(text)?,
            });
        };

        let Some(close) = text[open..].find('>').map(|i| open + i) else {
            return Err(Error::InvalidAddress(format!("Unclosed '<' in {text}")));
        };

        let name = text[..open].trim().trim_matches('"').trim();
        Ok(Self {
            name: (!name.is_empty()).then(|| name.to_string()),
            address: Address::new(text[open + 1..close].trim())?,
        })
    }

    /// Parses a comma-separated mailbox list such as a `To` header value.
    ///
    /// Commas inside double quotes or angle brackets do not split entries.
    /// Empty entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first entry's parse error.
    pub fn parse_list(text: &str) -> Result<Vec<Self>> {
        let mut mailboxes = Vec::new();
        let mut quoted = false;
        let mut angle = false;
        let mut start = 0;

        for (i, c) in text.char_indices() {
            match c {
                '"' => quoted = !quoted,
                '<' if !quoted => angle = true,
                '>' if !quoted => angle = false,
                ',' if !quoted && !angle => {
                    Self::push_entry(&text[start..i], &mut mailboxes)?;
                    start = i + 1;
                }
                _ => {}
            }
        }
        Self::push_entry(&text[start..], &mut mailboxes)?;

        Ok(mailboxes)
    }

    fn push_entry(entry: &str, out: &mut Vec<Self>) -> Result<()> {
        if !entry.trim().is_empty() {
            out.push(Self::parse(entry)?);
        }
        Ok(())
    }
}
