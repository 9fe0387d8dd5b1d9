//! SMTP transport configuration.
//!
//! Settings live in `<config dir>/mailthread/send.json`. Files with a `.cfg`
//! extension are read in the older line-based `Key=Value` format.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Security/encryption mode for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    /// No encryption (not recommended).
    None,
    /// Implicit TLS (connect directly with TLS).
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    #[default]
    StartTls,
}

impl Security {
    /// Get default port for the security mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None => 25,
            Self::Tls => 465,
            Self::StartTls => 587,
        }
    }
}

/// SMTP server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Name the server certificate must match (defaults to `host`).
    #[serde(default)]
    pub name: String,
    /// Server hostname.
    pub host: String,
    /// Server port (0 selects the default for `security`).
    #[serde(default)]
    pub port: u16,
    /// Security mode.
    #[serde(default)]
    pub security: Security,
    /// Username for authentication.
    pub username: String,
    /// Password for authentication.
    pub password: String,
}

impl SmtpConfig {
    /// Returns the default configuration file location.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mailthread")
            .join("send.json")
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if required
    /// settings are missing.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {e}", path.display())))?;

        let config = if path.extension().is_some_and(|ext| ext == "cfg") {
            Self::parse_legacy(&contents)?
        } else {
            Self::parse_json(&contents)?
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), host = %config.host, "loaded smtp config");
        Ok(config)
    }

    /// Parses the JSON format.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration object.
    pub fn parse_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Parses the legacy `Key=Value` format.
    ///
    /// Recognized keys are `Name`, `Username`, `Password`, `Address`, `Port`
    /// and `TLS`. All but `TLS` must be present and non-empty. `TLS=false`
    /// selects a plaintext session; otherwise STARTTLS is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required key is missing or `Port` is
    /// not a non-zero number.
    pub fn parse_legacy(contents: &str) -> Result<Self> {
        let mut config = Self::default();

        for line in contents.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim_end_matches('\r');
            match key {
                "Name" => config.name = value.to_string(),
                "Username" => config.username = value.to_string(),
                "Password" => config.password = value.to_string(),
                "Address" => config.host = value.to_string(),
                "Port" => {
                    config.port = value
                        .trim()
                        .parse()
                        .map_err(|_| Error::Config(format!("Invalid Port: {value:?}")))?;
                }
                "TLS" if value.trim() == "false" => config.security = Security::None,
                _ => {}
            }
        }

        for (key, value) in [
            ("Name", &config.name),
            ("Username", &config.username),
            ("Password", &config.password),
            ("Address", &config.host),
        ] {
            if value.is_empty() {
                return Err(Error::Config(format!("Missing {key} setting")));
            }
        }
        if config.port == 0 {
            return Err(Error::Config("Missing Port setting".into()));
        }

        Ok(config)
    }

    /// Checks that the settings needed to deliver mail are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("host", &self.host),
            ("username", &self.username),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("SMTP {field} is required")));
            }
        }
        Ok(())
    }

    /// Returns the port to connect to.
    #[must_use]
    pub const fn effective_port(&self) -> u16 {
        if self.port == 0 {
            self.security.default_port()
        } else {
            self.port
        }
    }

    /// Returns the name the TLS certificate is verified against.
    #[must_use]
    pub fn tls_server_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.host
        } else {
            &self.name
        }
    }
}
