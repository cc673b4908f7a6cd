//! Application configuration (HTTP server + retrieval backend), loaded from
//! the environment.

use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};
use url::Url;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,
    pub retrieval_api_url: Url,
    pub retrieval_timeout: Duration,
    pub expand_with_conversation: bool,
    pub frontend_dir: String,
    pub open_browser: bool,
}

impl AppConfig {
    /// Loads the configuration from environment variables (`.env` is read
    /// by the caller beforehand).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:3322".to_string());

        let api_url =
            lookup("RETRIEVAL_API_URL").unwrap_or_else(|| "http://localhost:8000".to_string());
        let retrieval_api_url = Url::parse(&api_url)
            .map_err(|e| anyhow!("Invalid RETRIEVAL_API_URL '{api_url}': {e}"))?;

        let timeout_secs = match lookup("RETRIEVAL_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| anyhow!("RETRIEVAL_TIMEOUT_SECS must be a whole number, got '{raw}'"))?,
            None => 30,
        };

        let expand_with_conversation = parse_flag(&lookup, "EXPAND_WITH_CONVERSATION", true)?;
        let open_browser = parse_flag(&lookup, "OPEN_BROWSER", true)?;
        let frontend_dir = lookup("FRONTEND_DIR").unwrap_or_else(|| "frontend".to_string());

        Ok(Self {
            server_addr,
            retrieval_api_url,
            retrieval_timeout: Duration::from_secs(timeout_secs),
            expand_with_conversation,
            frontend_dir,
            open_browser,
        })
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("{key} must be a boolean, got '{raw}'")),
        },
    }
}
