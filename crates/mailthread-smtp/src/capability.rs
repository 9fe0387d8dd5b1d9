//! Server capabilities advertised in the EHLO reply.

use crate::reply::Reply;

/// What the server said it supports.
///
/// Only the keywords this client acts on are interpreted; everything else
/// is kept verbatim in `other`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Server hostname from the first EHLO line.
    pub hostname: String,
    /// STARTTLS is available.
    pub starttls: bool,
    /// Advertised SASL mechanisms, uppercased.
    pub auth_mechanisms: Vec<String>,
    /// Remaining extension lines.
    pub other: Vec<String>,
}

impl Capabilities {
    /// Interprets an EHLO reply.
    #[must_use]
    pub fn from_ehlo(reply: &Reply) -> Self {
        let mut caps = Self {
            hostname: reply
                .lines
                .first()
                .and_then(|line| line.split_whitespace().next())
                .unwrap_or_default()
                .to_string(),
            ..Self::default()
        };

        for line in reply.lines.iter().skip(1) {
            let mut words = line.split_whitespace();
            let Some(keyword) = words.next() else {
                continue;
            };

            match keyword.to_ascii_uppercase().as_str() {
                "STARTTLS" => caps.starttls = true,
                "AUTH" => caps
                    .auth_mechanisms
                    .extend(words.map(str::to_ascii_uppercase)),
                // Pre-standard "AUTH=" form still sent by some servers.
                kw if kw.starts_with("AUTH=") => caps.auth_mechanisms.extend(
                    std::iter::once(&kw[5..])
                        .chain(words)
                        .map(str::to_ascii_uppercase),
                ),
                _ => caps.other.push(line.clone()),
            }
        }

        caps.auth_mechanisms.sort();
        caps.auth_mechanisms.dedup();
        caps
    }

    /// Checks whether a SASL mechanism was advertised.
    #[must_use]
    pub fn supports_auth(&self, mechanism: &str) -> bool {
        self.auth_mechanisms
            .iter()
            .any(|m| m.eq_ignore_ascii_case(mechanism))
    }
}
