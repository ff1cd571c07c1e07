use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which retrieval path produced the page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FetchSource {
    Direct,
    Fallback,
}

impl fmt::Display for FetchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchSource::Direct => f.write_str("direct"),
            FetchSource::Fallback => f.write_str("fallback"),
        }
    }
}

/// A listing as found on the search page during one run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Listing {
    pub external_id: String,
    pub price: String,
    pub location: String,
    pub link: String,
}

impl Listing {
    /// Chat message announcing this listing
    pub fn announcement(&self) -> String {
        let price = if self.price.is_empty() {
            "n/a"
        } else {
            self.price.as_str()
        };
        let location = if self.location.is_empty() {
            "n/a"
        } else {
            self.location.as_str()
        };

        format!(
            "New listing detected!\nPrice: {}\nLocation: {}\n{}",
            price, location, self.link
        )
    }
}

/// A listing row as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredListing {
    pub id: i64,
    pub external_id: String,
    pub price: Option<String>,
    pub location: Option<String>,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}
