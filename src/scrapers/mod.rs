pub mod ingatlan;
pub mod traits;
pub mod types;

pub use ingatlan::IngatlanFetcher;
pub use traits::PageFetcher;
pub use types::{FetchFailure, FetchedPage, Site};
