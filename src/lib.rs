//! Watches an ingatlan.com search page and announces listings it has not
//! seen before.

pub mod config;
pub mod extract;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod scrapers;
pub mod server;
pub mod store;

pub use config::Config;
pub use pipeline::{HuntResponse, Hunter};
