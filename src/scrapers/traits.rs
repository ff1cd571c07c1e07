use crate::scrapers::types::{FetchFailure, FetchedPage};
use async_trait::async_trait;

/// Common trait for anything that can produce the search results page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the search page, falling back to proxies when blocked
    async fn fetch(&self) -> Result<FetchedPage, FetchFailure>;

    /// Get the name of the fetched source
    fn source_name(&self) -> &'static str;
}
