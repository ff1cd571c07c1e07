use crate::models::FetchSource;
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::{FetchFailure, FetchedPage, Site};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, REFERER, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml";
const ACCEPT_LANGUAGES: &str = "hu-HU,hu;q=0.9,en-US;q=0.8,en;q=0.7";

/// Fetches the ingatlan.com search page directly, or through text-rendering
/// proxies when the site answers 403
pub struct IngatlanFetcher {
    client: Client,
    search_url: String,
    referer: String,
    fallback_proxies: Vec<String>,
}

impl IngatlanFetcher {
    pub fn new(search_url: &str, site: &Site, fallback_proxies: Vec<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            search_url: search_url.to_string(),
            referer: format!("{}/", site.origin),
            fallback_proxies,
        })
    }

    /// Search URL without its scheme, as the proxies expect it
    fn proxy_target(&self) -> &str {
        self.search_url
            .strip_prefix("https://")
            .or_else(|| self.search_url.strip_prefix("http://"))
            .unwrap_or(&self.search_url)
    }

    async fn fetch_direct(&self) -> Result<FetchedPage, FetchFailure> {
        debug!("Fetching URL: {}", self.search_url);

        let response = self
            .client
            .get(&self.search_url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGES)
            .header(REFERER, &self.referer)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| FetchFailure::Transport(e.to_string()))?;

            if body.trim().is_empty() {
                warn!("Search page returned an empty body");
                return Err(FetchFailure::EmptyBody);
            }

            debug!("Downloaded {} bytes directly", body.len());
            return Ok(FetchedPage {
                body,
                source: FetchSource::Direct,
            });
        }

        if status != StatusCode::FORBIDDEN {
            warn!("Search page returned status: {}", status);
            return Err(FetchFailure::Status {
                status: status.as_u16(),
            });
        }

        warn!("Search page blocked ({}), trying fallbacks", status);
        self.fetch_via_fallbacks().await.ok_or(FetchFailure::Blocked {
            status: status.as_u16(),
        })
    }

    async fn fetch_via_fallbacks(&self) -> Option<FetchedPage> {
        let target = self.proxy_target();

        for base in &self.fallback_proxies {
            let url = format!("{}{}", base, target);
            debug!("Trying fallback: {}", url);

            let response = match self
                .client
                .get(&url)
                .header(USER_AGENT, BROWSER_USER_AGENT)
                .header(ACCEPT, ACCEPT_HTML)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(fallback = %base, error = %e, "Fallback request failed");
                    continue;
                }
            };

            if !response.status().is_success() {
                warn!(fallback = %base, status = %response.status(), "Fallback returned error status");
                continue;
            }

            match response.text().await {
                Ok(body) if !body.trim().is_empty() => {
                    info!(fallback = %base, bytes = body.len(), "Fetched search page via fallback");
                    return Some(FetchedPage {
                        body,
                        source: FetchSource::Fallback,
                    });
                }
                Ok(_) => warn!(fallback = %base, "Fallback returned an empty body"),
                Err(e) => warn!(fallback = %base, error = %e, "Failed to read fallback body"),
            }
        }

        None
    }
}

#[async_trait]
impl PageFetcher for IngatlanFetcher {
    async fn fetch(&self) -> Result<FetchedPage, FetchFailure> {
        info!("Fetching search page from {}", self.source_name());
        self.fetch_direct().await
    }

    fn source_name(&self) -> &'static str {
        "ingatlan.com"
    }
}
