use crate::config::Config;
use crate::extract::ListingExtractor;
use crate::models::{FetchSource, Listing};
use crate::notify::{Notifier, TelegramNotifier};
use crate::scrapers::{FetchFailure, IngatlanFetcher, PageFetcher};
use crate::store::{InsertOutcome, ListingStore, SqliteListingStore, StoreError};
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Summary returned to whoever triggered a run
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum HuntResponse {
    Completed {
        ok: bool,
        scraped: usize,
        inserted: usize,
        source: FetchSource,
    },
    Failed {
        ok: bool,
        status: u16,
        message: String,
    },
}

impl HuntResponse {
    fn completed(scraped: usize, inserted: usize, source: FetchSource) -> Self {
        HuntResponse::Completed {
            ok: true,
            scraped,
            inserted,
            source,
        }
    }

    fn failed(status: u16, message: String) -> Self {
        HuntResponse::Failed {
            ok: false,
            status,
            message,
        }
    }

    fn fetch_failed(failure: &FetchFailure, host: &str) -> Self {
        let message = if failure.is_blocked() {
            format!(
                "Failed to fetch {} listings ({} blocked). All fallback proxies failed; consider another proxy.",
                host,
                failure.status()
            )
        } else {
            format!("Failed to fetch {} listings: {}", host, failure)
        };
        Self::failed(failure.status(), message)
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, HuntResponse::Completed { .. })
    }

    /// HTTP status for this response
    pub fn status(&self) -> u16 {
        match self {
            HuntResponse::Completed { .. } => 200,
            HuntResponse::Failed { status, .. } => *status,
        }
    }
}

/// Fetch, extract, store and announce new listings
pub struct Hunter {
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn ListingStore>,
    notifier: Arc<dyn Notifier>,
    extractor: ListingExtractor,
}

impl Hunter {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn ListingStore>,
        notifier: Arc<dyn Notifier>,
        extractor: ListingExtractor,
    ) -> Self {
        Self {
            fetcher,
            store,
            notifier,
            extractor,
        }
    }

    /// Wire up the real fetcher, SQLite store and Telegram notifier
    pub async fn from_config(config: &Config) -> Result<Self> {
        let site = config.site()?;

        let fetcher = IngatlanFetcher::new(&config.search_url, &site, config.fallback_proxies.clone())?;
        let store = SqliteListingStore::connect(&config.database_url)
            .await
            .context("Failed to open listing store")?;
        let notifier = TelegramNotifier::new(
            &config.telegram_api_base,
            &config.telegram_bot_token,
            &config.telegram_chat_id,
        )?;
        let extractor = ListingExtractor::new(site).context("Failed to build listing extractor")?;

        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(store),
            Arc::new(notifier),
            extractor,
        ))
    }

    pub fn store(&self) -> &Arc<dyn ListingStore> {
        &self.store
    }

    /// Run the whole pipeline once
    pub async fn run(&self) -> HuntResponse {
        let page = match self.fetcher.fetch().await {
            Ok(page) => page,
            Err(failure) => {
                warn!(error = %failure, status = failure.status(), "Fetch failed");
                return HuntResponse::fetch_failed(&failure, &self.extractor.site().host);
            }
        };

        let listings = self.extractor.extract(&page.body);
        info!(
            source = %page.source,
            scraped = listings.len(),
            "Scraped listings from {}",
            self.fetcher.source_name()
        );

        let mut inserted = 0;
        for listing in &listings {
            match self.store_if_new(listing).await {
                Ok(true) => {
                    inserted += 1;
                    info!(external_id = %listing.external_id, "New listing stored");
                    if let Err(e) = self.notifier.notify(listing).await {
                        warn!(external_id = %listing.external_id, error = %e, "Notification failed");
                    }
                }
                Ok(false) => debug!(external_id = %listing.external_id, "Listing already known"),
                Err(e) => {
                    error!(external_id = %listing.external_id, error = %e, "Failed to store listing");
                    return HuntResponse::failed(500, format!("Failed to store listings: {}", e));
                }
            }
        }

        info!(scraped = listings.len(), inserted, "Hunt finished");
        HuntResponse::completed(listings.len(), inserted, page.source)
    }

    /// Returns true only when this call wrote the row
    async fn store_if_new(&self, listing: &Listing) -> Result<bool, StoreError> {
        if self.store.exists(&listing.external_id).await? {
            return Ok(false);
        }

        let outcome = self.store.insert(listing).await?;
        Ok(outcome == InsertOutcome::Inserted)
    }
}
