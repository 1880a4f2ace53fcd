//! Configuration management for the command-line host.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_LOOKUP_URL: &str = "https://api.crossref.org/works";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Host configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Library file, or a directory holding `db.json`
    pub library: PathBuf,
    /// Base URL of the works endpoint
    pub lookup_url: reqwest::Url,
    /// Contact address sent to the metadata service
    pub mailto: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Program that opens documents and web pages; the platform default if unset
    pub opener: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let library = var("REFSHELF_LIBRARY")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let raw_url =
            var("REFSHELF_LOOKUP_URL").unwrap_or_else(|| DEFAULT_LOOKUP_URL.to_string());
        let lookup_url = reqwest::Url::parse(raw_url.trim())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or(ConfigError::InvalidLookupUrl(raw_url))?;

        let mailto = var("REFSHELF_MAILTO").filter(|m| !m.trim().is_empty());
        let opener = var("REFSHELF_OPENER").filter(|o| !o.trim().is_empty());

        let timeout = match var("REFSHELF_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            library,
            lookup_url,
            mailto,
            timeout: Duration::from_secs(timeout),
            opener,
        })
    }

    /// User-Agent for outgoing requests.
    pub fn user_agent(&self) -> String {
        let base = format!("refshelf/{}", env!("CARGO_PKG_VERSION"));
        match &self.mailto {
            Some(mailto) => format!("{} (mailto:{})", base, mailto),
            None => base,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid REFSHELF_TIMEOUT_SECS value '{0}'")]
    InvalidTimeout(String),

    #[error("Invalid REFSHELF_LOOKUP_URL value '{0}'")]
    InvalidLookupUrl(String),
}
