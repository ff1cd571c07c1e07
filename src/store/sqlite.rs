use super::{InsertOutcome, ListingStore, StoreError};
use crate::models::{Listing, StoredListing};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::debug;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS listings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id TEXT NOT NULL,
    price TEXT,
    location TEXT,
    link TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

const CREATE_UNIQUE_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS listings_external_id_unique ON listings (external_id)
"#;

#[derive(Debug, Clone)]
pub struct SqliteListingStore {
    pool: SqlitePool,
}

impl SqliteListingStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database; a single connection keeps it alive
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_UNIQUE_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    fn row_to_listing(row: &SqliteRow) -> Result<StoredListing, StoreError> {
        Ok(StoredListing {
            id: row.try_get("id")?,
            external_id: row.try_get("external_id")?,
            price: row.try_get("price")?,
            location: row.try_get("location")?,
            link: row.try_get("link")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl ListingStore for SqliteListingStore {
    async fn exists(&self, external_id: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT id FROM listings WHERE external_id = ? LIMIT 1")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn insert(&self, listing: &Listing) -> Result<InsertOutcome, StoreError> {
        let result = sqlx::query(
            "INSERT INTO listings (external_id, price, location, link) VALUES (?, ?, ?, ?) \
             ON CONFLICT (external_id) DO NOTHING",
        )
        .bind(&listing.external_id)
        .bind(&listing.price)
        .bind(&listing.location)
        .bind(&listing.link)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!(external_id = %listing.external_id, "Insert skipped, id already stored");
            return Ok(InsertOutcome::AlreadyExists);
        }

        Ok(InsertOutcome::Inserted)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<StoredListing>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, external_id, price, location, link, created_at \
             FROM listings ORDER BY id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_listing).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str) -> Listing {
        Listing {
            external_id: id.to_string(),
            price: "45 M Ft".to_string(),
            location: "Budapest XIII. kerület".to_string(),
            link: format!("https://ingatlan.com/{}", id),
        }
    }

    #[tokio::test]
    async fn insert_then_exists() {
        let store = SqliteListingStore::in_memory().await.unwrap();

        assert!(!store.exists("12345").await.unwrap());
        assert_eq!(
            store.insert(&listing("12345")).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert!(store.exists("12345").await.unwrap());
        assert!(!store.exists("54321").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_insert_is_not_an_error() {
        let store = SqliteListingStore::in_memory().await.unwrap();
        store.insert(&listing("1")).await.unwrap();

        let mut changed = listing("1");
        changed.price = "50 M Ft".to_string();

        assert_eq!(
            store.insert(&changed).await.unwrap(),
            InsertOutcome::AlreadyExists
        );

        let stored = store.recent(10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].price.as_deref(), Some("45 M Ft"));
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let store = SqliteListingStore::in_memory().await.unwrap();
        for id in ["1", "2", "3"] {
            store.insert(&listing(id)).await.unwrap();
        }

        let stored = store.recent(2).await.unwrap();

        let ids: Vec<&str> = stored.iter().map(|l| l.external_id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
        assert_eq!(stored[0].link.as_deref(), Some("https://ingatlan.com/3"));
        assert!(stored[0].id > stored[1].id);
    }

    #[tokio::test]
    async fn migrate_is_repeatable() {
        let store = SqliteListingStore::in_memory().await.unwrap();
        store.insert(&listing("1")).await.unwrap();

        let reopened = SqliteListingStore::from_pool(store.pool.clone()).await.unwrap();

        assert!(reopened.exists("1").await.unwrap());
    }
}
