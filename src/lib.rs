//! fabric-ids: Fabric REST API identity support matrix with headless Chrome
//!
//! Commands:
//! - menu: Print the API navigation menu
//! - scrape: Extract per-endpoint Microsoft Entra identity support to CSV

pub mod browser;
pub mod driver;
pub mod error;
pub mod extract;
pub mod menu;
pub mod report;
pub mod scrape;
pub mod support;
pub mod toc;

pub use driver::PageDriver;
pub use error::SkipReason;
pub use scrape::{crawl, fetch_endpoint, CrawlOutcome, ScrapeConfig, ScrapeReport};
pub use support::{aggregate, classify, EndpointRef, EndpointSet, IdentityKind, IdentityRecord};
pub use toc::{ClickErrorPolicy, ExpandConfig, ExpandReport, Site};
