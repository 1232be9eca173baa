//! Table-of-contents tree: expansion and link collection
//!
//! The docs site renders its navigation as a collapsible `ul[role="tree"]`.
//! Nested entries only exist in the DOM once their parent is expanded, so
//! the tree is clicked open before the HTML is parsed for links.

use crate::driver::PageDriver;
use crate::extract::stripped_text;
use crate::support::EndpointSet;
use scraper::{Html, Selector};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

/// Fabric REST API articles index
pub const ARTICLES_URL: &str = "https://learn.microsoft.com/en-us/rest/api/fabric/articles/";

pub const TREE_SELECTOR: &str = r#"ul[role="tree"]"#;
pub const COLLAPSED_SELECTOR: &str = r#"ul[role="tree"] [aria-expanded="false"]"#;
pub const MENU_SELECTOR: &str = "ul.tree.table-of-contents";

/// Where the API reference lives and how its links look
#[derive(Debug, Clone)]
pub struct Site {
    /// Scheme and host used to absolutize relative links
    pub host: String,
    /// Index page holding the navigation tree
    pub articles_url: String,
    /// Path fragment every endpoint link contains
    pub api_path: String,
    /// Link text of the tree's root entry, which is not an endpoint
    pub root_title: String,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            host: "https://learn.microsoft.com".to_string(),
            articles_url: ARTICLES_URL.to_string(),
            api_path: "/rest/api/fabric/".to_string(),
            root_title: "Microsoft Fabric REST API documentation".to_string(),
        }
    }
}

/// What to do when clicking a collapsed node fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ClickErrorPolicy {
    /// Ignore the node silently (debug log only)
    #[default]
    Skip,
    /// Log a warning and carry on with the next node
    Warn,
    /// Stop expanding at the first failure
    Abort,
}

/// Expansion timings and limits
#[derive(Debug, Clone)]
pub struct ExpandConfig {
    pub tree_timeout_ms: u64,
    pub max_passes: usize,
    pub click_timeout_ms: u64,
    pub click_pause_ms: u64,
    pub pass_pause_ms: u64,
    pub settle_ms: u64,
    pub on_click_error: ClickErrorPolicy,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            tree_timeout_ms: 10_000,
            max_passes: 5,
            click_timeout_ms: 500,
            click_pause_ms: 30,
            pass_pause_ms: 1_000,
            settle_ms: 2_000,
            on_click_error: ClickErrorPolicy::Skip,
        }
    }
}

/// What expansion did
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandReport {
    pub tree_found: bool,
    pub passes: usize,
    pub clicks: usize,
    pub failed_clicks: usize,
    /// Collapsed nodes seen at the start of the last pass
    pub last_seen_collapsed: usize,
    pub aborted: bool,
}

/// Click every collapsed tree node open, pass after pass, until none remain
/// or `max_passes` is reached. Best effort: nothing here is fatal.
pub async fn expand_tree<D: PageDriver>(driver: &D, config: &ExpandConfig) -> ExpandReport {
    let mut report = ExpandReport::default();

    if let Err(e) = driver
        .wait_for_selector(TREE_SELECTOR, config.tree_timeout_ms)
        .await
    {
        warn!("Expansion failed: {}", e);
        driver.pause(config.settle_ms).await;
        return report;
    }
    report.tree_found = true;

    'passes: for attempt in 1..=config.max_passes {
        let collapsed = match driver.query_all(COLLAPSED_SELECTOR).await {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!("Expansion failed: {}", e);
                break;
            }
        };

        info!(
            "Expansion attempt {}: found {} expandable items",
            attempt,
            collapsed.len()
        );
        report.passes = attempt;
        report.last_seen_collapsed = collapsed.len();

        if collapsed.is_empty() {
            break;
        }

        for node in &collapsed {
            match driver.click(node, config.click_timeout_ms).await {
                Ok(()) => {
                    report.clicks += 1;
                    driver.pause(config.click_pause_ms).await;
                }
                Err(e) => {
                    report.failed_clicks += 1;
                    match config.on_click_error {
                        ClickErrorPolicy::Skip => debug!("skipping node: {}", e),
                        ClickErrorPolicy::Warn => warn!("Could not expand node: {}", e),
                        ClickErrorPolicy::Abort => {
                            warn!("Could not expand node, stopping expansion: {}", e);
                            report.aborted = true;
                            break 'passes;
                        }
                    }
                }
            }
        }

        driver.pause(config.pass_pause_ms).await;
    }

    driver.pause(config.settle_ms).await;
    report
}

/// Collect endpoint links from the navigation tree in `html`.
///
/// Keeps links whose href contains the API path, skipping the root entry.
/// Relative hrefs are resolved against the site host.
pub fn collect_endpoints(html: &str, site: &Site) -> EndpointSet {
    let mut endpoints = EndpointSet::new();

    let doc = Html::parse_document(html);
    let (Ok(tree_sel), Ok(link_sel)) = (Selector::parse(TREE_SELECTOR), Selector::parse("a"))
    else {
        return endpoints;
    };

    let Some(tree) = doc.select(&tree_sel).next() else {
        warn!("TOC not found");
        return endpoints;
    };

    let base = match Url::parse(&site.host) {
        Ok(u) => u,
        Err(e) => {
            warn!("Invalid site host {}: {}", site.host, e);
            return endpoints;
        }
    };

    for link in tree.select(&link_sel) {
        let href = link.value().attr("href").unwrap_or("");
        let text = stripped_text(link);

        if href.is_empty()
            || text.is_empty()
            || !href.contains(&site.api_path)
            || text == site.root_title
        {
            continue;
        }

        match base.join(href) {
            Ok(url) => endpoints.insert(text, url.to_string()),
            Err(e) => debug!("skipping unresolvable href {}: {}", href, e),
        }
    }

    endpoints
}

/// Stripped text of every `<li>` under the first element matching `selector`.
/// `None` when nothing matches.
pub fn menu_items(html: &str, selector: &str) -> Option<Vec<String>> {
    let doc = Html::parse_document(html);
    let list_sel = Selector::parse(selector).ok()?;
    let item_sel = Selector::parse("li").ok()?;

    let list = doc.select(&list_sel).next()?;
    Some(list.select(&item_sel).map(stripped_text).collect())
}
