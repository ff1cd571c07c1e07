pub mod telegram;

use crate::models::Listing;
use async_trait::async_trait;
use thiserror::Error;

pub use telegram::TelegramNotifier;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Request(reqwest::Error),

    #[error("chat API returned status {status}: {body}")]
    Rejected { status: u16, body: String },
}

// The request URL carries the bot token, so it never reaches the message
impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        NotifyError::Request(e.without_url())
    }
}

/// Outbound channel announcing new listings
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, listing: &Listing) -> Result<(), NotifyError>;
}
