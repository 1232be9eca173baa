//! Page automation seam
//!
//! The crawl only ever talks to a single tab through this trait, so the
//! chromiumoxide session and the in-memory test site are interchangeable.

use anyhow::Result;

/// One browser tab, as seen by the crawler
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Handle to an element returned by [`PageDriver::query_all`]
    type Node;

    /// Navigate to `url`, failing if the load takes longer than `timeout_ms`
    async fn navigate(&self, url: &str, timeout_ms: u64) -> Result<()>;

    /// Wait (bounded) for the current document to finish loading.
    /// Requests the page starts after its load event are not waited for.
    async fn wait_for_load(&self, timeout_ms: u64) -> Result<()>;

    /// Wait until at least one element matches `selector`
    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()>;

    /// All elements currently matching `selector`
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>>;

    /// Click a node, giving up after `timeout_ms`
    async fn click(&self, node: &Self::Node, timeout_ms: u64) -> Result<()>;

    /// Rendered HTML of the current page
    async fn content(&self) -> Result<String>;

    /// Fixed delay between actions
    async fn pause(&self, ms: u64);
}
