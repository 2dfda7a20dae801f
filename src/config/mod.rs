//! Environment-backed service configuration.
//!
//! Missing OAuth settings are the only process-fatal condition in the
//! service: everything downstream degrades instead of dying.

use anyhow::{anyhow, Result};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3001";
const DEFAULT_MAX_FEED_SIZE: usize = 100;
const DEFAULT_PARTITION_PAGE_SIZE: u32 = 30;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth client ID (`GOOGLE_CLIENT_ID`).
    pub client_id: String,
    /// OAuth client secret (`GOOGLE_CLIENT_SECRET`).
    pub client_secret: String,
    /// Registered OAuth redirect URI (`OAUTH_REDIRECT_URI`).
    pub redirect_uri: String,
    /// Frontend origin users are sent back to after connecting
    /// (`FRONTEND_URL`).
    pub frontend_url: String,
    /// Socket address to serve on (`LISTEN_ADDR`).
    pub listen_addr: String,
    /// Upper bound on the merged feed length (`MAX_FEED_SIZE`).
    pub max_feed_size: usize,
    /// Listing page size per partition query (`PARTITION_PAGE_SIZE`).
    pub partition_page_size: u32,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |name: &str| {
            lookup(name).ok_or_else(|| anyhow!("missing required environment variable: {name}"))
        };

        Ok(Self {
            client_id: require("GOOGLE_CLIENT_ID")?,
            client_secret: require("GOOGLE_CLIENT_SECRET")?,
            redirect_uri: require("OAUTH_REDIRECT_URI")?,
            frontend_url: lookup("FRONTEND_URL")
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            listen_addr: lookup("LISTEN_ADDR")
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            max_feed_size: lookup("MAX_FEED_SIZE")
                .map(|v| v.parse())
                .transpose()
                .map_err(|e| anyhow!("invalid MAX_FEED_SIZE: {e}"))?
                .unwrap_or(DEFAULT_MAX_FEED_SIZE),
            partition_page_size: lookup("PARTITION_PAGE_SIZE")
                .map(|v| v.parse())
                .transpose()
                .map_err(|e| anyhow!("invalid PARTITION_PAGE_SIZE: {e}"))?
                .unwrap_or(DEFAULT_PARTITION_PAGE_SIZE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("GOOGLE_CLIENT_ID", "id"),
        ("GOOGLE_CLIENT_SECRET", "secret"),
        ("OAUTH_REDIRECT_URI", "https://app.example.com/auth/callback"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_absent() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(config.frontend_url, DEFAULT_FRONTEND_URL);
        assert_eq!(config.max_feed_size, DEFAULT_MAX_FEED_SIZE);
        assert_eq!(config.partition_page_size, DEFAULT_PARTITION_PAGE_SIZE);
    }

    #[test]
    fn missing_required_var_fails() {
        let err = Config::from_lookup(lookup(&[("GOOGLE_CLIENT_ID", "id")])).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_CLIENT_SECRET"));
    }

    #[test]
    fn optional_overrides_are_honored() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("MAX_FEED_SIZE", "25"));
        vars.push(("LISTEN_ADDR", "127.0.0.1:8080"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.max_feed_size, 25);
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
    }

    #[test]
    fn malformed_numeric_override_fails() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("MAX_FEED_SIZE", "a lot"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }
}
