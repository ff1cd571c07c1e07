//! Durable record of every listing seen so far.

pub mod sqlite;

use crate::models::{Listing, StoredListing};
use async_trait::async_trait;
use thiserror::Error;

pub use sqlite::SqliteListingStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of trying to store a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Another writer stored the same external id first
    AlreadyExists,
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn exists(&self, external_id: &str) -> Result<bool, StoreError>;

    /// Insert unless the external id is already stored.
    async fn insert(&self, listing: &Listing) -> Result<InsertOutcome, StoreError>;

    /// Most recently stored listings, newest first
    async fn recent(&self, limit: u32) -> Result<Vec<StoredListing>, StoreError>;
}
