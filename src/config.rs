use crate::scrapers::Site;
use std::env;
use thiserror::Error;

pub const DEFAULT_SEARCH_URL: &str =
    "https://ingatlan.com/szukites/elado+lakas+budapest+maganszemely";
pub const DEFAULT_FALLBACK_PROXY: &str = "https://r.jina.ai/http://";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://listings.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Runtime settings for one deployment
#[derive(Debug, Clone)]
pub struct Config {
    pub search_url: String,
    /// Proxy base URLs tried in order when the direct fetch is blocked
    pub fallback_proxies: Vec<String>,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub telegram_api_base: String,
    pub database_url: String,
    pub bind_addr: String,
}

impl Config {
    /// Load settings from the process environment (and `.env`, if present)
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let search_url = get("SEARCH_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string());
        Site::from_url(&search_url).map_err(|e| ConfigError::Invalid {
            name: "SEARCH_URL",
            reason: e.to_string(),
        })?;

        let fallback_proxies = match get("FALLBACK_PROXIES") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            None => vec![DEFAULT_FALLBACK_PROXY.to_string()],
        };

        Ok(Self {
            search_url,
            fallback_proxies,
            telegram_bot_token: require("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: require("TELEGRAM_CHAT_ID")?,
            telegram_api_base: get("TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }

    pub fn site(&self) -> Result<Site, ConfigError> {
        Site::from_url(&self.search_url).map_err(|e| ConfigError::Invalid {
            name: "SEARCH_URL",
            reason: e.to_string(),
        })
    }
}
