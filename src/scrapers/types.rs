use crate::models::FetchSource;
use thiserror::Error;
use url::Url;

/// The site being watched, derived from the search URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// Scheme and host as given, e.g. `https://www.ingatlan.com`
    pub origin: String,
    /// Host without a leading `www.`
    pub host: String,
}

impl Site {
    pub fn from_url(search_url: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(search_url)?;
        let full_host = url.host_str().ok_or(url::ParseError::EmptyHost)?;

        let origin = match url.port() {
            Some(port) => format!("{}://{}:{}", url.scheme(), full_host, port),
            None => format!("{}://{}", url.scheme(), full_host),
        };
        let host = full_host
            .strip_prefix("www.")
            .unwrap_or(full_host)
            .to_string();

        Ok(Self { origin, host })
    }
}

/// Page content together with the path that retrieved it
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: String,
    pub source: FetchSource,
}

/// Why the search page could not be retrieved
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("blocked with status {status} and no fallback succeeded")]
    Blocked { status: u16 },

    #[error("search page returned status {status}")]
    Status { status: u16 },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("search page returned an empty body")]
    EmptyBody,
}

impl FetchFailure {
    /// HTTP-like status reported to the caller
    pub fn status(&self) -> u16 {
        match self {
            FetchFailure::Blocked { status } | FetchFailure::Status { status } => *status,
            FetchFailure::Transport(_) => 502,
            FetchFailure::EmptyBody => 500,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, FetchFailure::Blocked { .. })
    }
}
