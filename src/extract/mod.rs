//! Listing extraction from a fetched search page.
//!
//! Strategies run in a fixed order and the first one that finds anything
//! wins; results from different strategies are never merged:
//!
//! 1. the embedded `__NEXT_DATA__` JSON payload
//! 2. containers marked with a listing id attribute
//! 3. anchors pointing at listing pages
//! 4. a regex scan of the raw text for listing URLs

mod anchors;
mod attributes;
mod embedded;
pub mod normalize;
mod raw_text;

use crate::models::Listing;
use crate::scrapers::Site;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

pub use normalize::{normalize_text, to_absolute_link, LinkRules};

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid selector {0}")]
    Selector(String),
}

/// A fetched page, parsed once and shared by the strategies
pub(crate) struct Page<'a> {
    raw: &'a str,
    document: Html,
}

type Strategy = fn(&ListingExtractor, &Page<'_>) -> Vec<Listing>;

const STRATEGIES: [(&str, Strategy); 4] = [
    ("embedded data", embedded::from_embedded_data),
    ("attribute containers", attributes::from_attribute_containers),
    ("listing anchors", anchors::from_listing_anchors),
    ("raw text urls", raw_text::from_raw_urls),
];

/// Listings in discovery order, at most one per external id
#[derive(Default)]
pub(crate) struct Collected {
    seen: HashSet<String>,
    listings: Vec<Listing>,
}

impl Collected {
    /// Keep `listing` unless its id is empty or already taken.
    pub(crate) fn push(&mut self, listing: Listing) -> bool {
        if listing.external_id.is_empty() || self.seen.contains(&listing.external_id) {
            return false;
        }
        self.seen.insert(listing.external_id.clone());
        self.listings.push(listing);
        true
    }

    pub(crate) fn into_listings(self) -> Vec<Listing> {
        self.listings
    }
}

fn selector(css: &str) -> Result<Selector, ExtractorError> {
    Selector::parse(css).map_err(|e| ExtractorError::Selector(format!("{}: {:?}", css, e)))
}

fn selectors(css: &[&str]) -> Result<Vec<Selector>, ExtractorError> {
    css.iter().map(|c| selector(c)).collect()
}

/// Extracts listings for one site. Build once, reuse for every run.
#[derive(Debug)]
pub struct ListingExtractor {
    rules: LinkRules,
    embedded_data: Selector,
    containers: Vec<Selector>,
    anchor: Selector,
    price_selectors: Vec<Selector>,
    location_selectors: Vec<Selector>,
    price_hint: Regex,
    price_fallback: Regex,
    price_compact: Regex,
    district: Regex,
}

impl ListingExtractor {
    pub fn new(site: Site) -> Result<Self, ExtractorError> {
        Ok(Self {
            rules: LinkRules::new(site)?,
            embedded_data: selector(embedded::EMBEDDED_DATA_SELECTOR)?,
            containers: selectors(&attributes::CONTAINER_SELECTORS)?,
            anchor: selector("a[href]")?,
            price_selectors: selectors(&attributes::PRICE_SELECTORS)?,
            location_selectors: selectors(&attributes::LOCATION_SELECTORS)?,
            price_hint: Regex::new(r"Ft|HUF|\d")?,
            price_fallback: Regex::new(r"\b\d[\d\s.]*\s?(?:Ft|HUF)\b")?,
            price_compact: Regex::new(
                r"\b\d{1,3}(?:[ .,]\d{1,3})*\s?(?:M|millió)?\s?(?:Ft|HUF)\b",
            )?,
            district: Regex::new(r"(?:Budapest,?\s+)?\b[IVXL]+\.\s*kerület\b")?,
        })
    }

    pub fn site(&self) -> &Site {
        &self.rules.site
    }

    /// Extract listings from page content (HTML, or text from a proxy).
    pub fn extract(&self, content: &str) -> Vec<Listing> {
        let page = Page {
            raw: content,
            document: Html::parse_document(content),
        };

        for (name, strategy) in STRATEGIES {
            let listings = strategy(self, &page);
            if !listings.is_empty() {
                info!(strategy = name, count = listings.len(), "Extracted listings");
                return listings;
            }
            debug!(strategy = name, "Strategy found no listings");
        }

        info!("No listings found on page");
        Vec::new()
    }
}

#[cfg(test)]
pub(crate) fn test_extractor() -> ListingExtractor {
    let site = Site::from_url("https://ingatlan.com/szukites/elado+lakas+budapest").unwrap();
    ListingExtractor::new(site).unwrap()
}
